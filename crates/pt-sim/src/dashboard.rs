//! Presentation sink for per-frame readouts.

/// What a frame produced: the triple the dashboard receives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutput {
    pub rpm: f64,
    pub speed_mph: f64,
    pub gear: u32,
}

/// Receives `(rpm, speed_mph, gear)` once per frame when registered.
pub trait Dashboard {
    fn show(&mut self, rpm: f64, speed_mph: f64, gear: u32);
}

impl<F> Dashboard for F
where
    F: FnMut(f64, f64, u32),
{
    fn show(&mut self, rpm: f64, speed_mph: f64, gear: u32) {
        self(rpm, speed_mph, gear)
    }
}
