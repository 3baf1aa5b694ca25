//! Throttle actuator with first-order dynamics and rate limiting.

use crate::error::{ComponentError, ComponentResult};

/// First-order actuator with rate limiting.
///
/// Dynamics: dpos/dt = (1/tau) * (cmd - pos), clamped to [-rate_limit, rate_limit].
/// Position stays within [0, 1].
#[derive(Clone, Debug)]
pub struct FirstOrderActuator {
    /// Time constant (seconds)
    pub tau: f64,
    /// Rate limit (1/second), must be positive
    pub rate_limit: f64,
}

impl FirstOrderActuator {
    pub fn new(tau: f64, rate_limit: f64) -> ComponentResult<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "tau must be positive",
            });
        }
        if rate_limit.is_nan() || rate_limit <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "rate_limit must be positive",
            });
        }
        Ok(Self { tau, rate_limit })
    }

    /// Position derivative given current position and command.
    pub fn dpdt(&self, position: f64, command: f64) -> f64 {
        let raw = (command - position) / self.tau;
        raw.clamp(-self.rate_limit, self.rate_limit)
    }

    /// Advance `position` by `dt` toward `command`.
    pub fn step(&self, position: f64, dt: f64, command: f64) -> f64 {
        let next = position + self.dpdt(position, command) * dt;
        next.clamp(0.0, 1.0)
    }
}
