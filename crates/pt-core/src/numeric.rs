use crate::PtError;

/// Pass `v` through unless it is NaN or infinite.
pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, PtError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PtError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, PtError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PtError::NonPositive { what, value: v })
    }
}

/// Piecewise-linear lookup over `(x, y)` points sorted by ascending `x`.
///
/// Values outside the table are held at the first/last `y`. An empty table
/// yields zero.
pub fn interp_linear(points: &[(f64, f64)], x: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }

    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            let span = x1 - x0;
            if span <= 0.0 {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / span;
        }
    }
    last.1
}
