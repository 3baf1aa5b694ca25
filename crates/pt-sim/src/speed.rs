//! Dashboard speed derived from engine rpm.
//!
//! In gear the readout follows the crank through the total ratio:
//!
//! ```text
//! wheel_rpm = engine_rpm / N_total
//! mph       = wheel_rpm · (2π · r · 39.3701) · 60 / 63360
//! readout   = mph · SPEED_SCALE
//! ```
//!
//! In neutral nothing drives the readout, so it coasts down linearly.

use pt_core::constants::{INCHES_PER_METER, INCHES_PER_MILE, MINUTES_PER_HOUR};
use std::f64::consts::TAU;

/// Tuning gain on the in-gear readout. Not a unit conversion.
pub const SPEED_SCALE: f64 = 3.5;

/// Neutral coast-down rate (mph per second).
pub const NEUTRAL_DECAY_MPH_PER_S: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedInputs {
    pub gear: u32,
    pub engine_rpm: f64,
    /// Only read when `gear > 0`
    pub total_gear_ratio: f64,
    /// Wheel radius (m)
    pub wheel_radius: f64,
}

/// Road speed in mph for a wheel turning at `wheel_rpm`, before scaling.
pub fn wheel_mph(wheel_rpm: f64, wheel_radius: f64) -> f64 {
    let circumference_in = TAU * (wheel_radius * INCHES_PER_METER);
    wheel_rpm * circumference_in * MINUTES_PER_HOUR / INCHES_PER_MILE
}

/// New readout given the previous one and the frame duration.
///
/// A zero total ratio while in gear divides by zero and yields a non-finite
/// readout; gearbox configuration validation is what rules that out.
pub fn display_speed(inputs: SpeedInputs, previous_mph: f64, dt: f64) -> f64 {
    if inputs.gear > 0 {
        let wheel_rpm = inputs.engine_rpm / inputs.total_gear_ratio;
        let mph = wheel_mph(wheel_rpm, inputs.wheel_radius) * SPEED_SCALE;
        // NaN passes through untouched
        if mph < 0.0 { 0.0 } else { mph }
    } else {
        (previous_mph - dt * NEUTRAL_DECAY_MPH_PER_S).max(0.0)
    }
}
