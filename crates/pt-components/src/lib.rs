//! pt-components: reference engine, drivetrain and audio collaborators.
//!
//! Provides:
//! - An XPBD rotating shaft and the scalar gear-joint constraint between a
//!   crank and a drivetrain output shaft
//! - A throttle actuator with first-order lag and rate limiting
//! - `CombustionEngine` and `ManualDrivetrain`, implementing the stepper's
//!   collaborator traits
//! - `SampleBank`, an audio backend that loads engine loops from disk
//!
//! Each collaborator owns its own state and only sees the other side through
//! the read-only views handed over by the sub-step protocol.

pub mod actuator;
pub mod audio;
pub mod coupling;
pub mod drivetrain;
pub mod engine;
pub mod error;
pub mod shaft;

pub use actuator::FirstOrderActuator;
pub use audio::SampleBank;
pub use coupling::{output_correction, position_lambda, velocity_impulse};
pub use drivetrain::ManualDrivetrain;
pub use engine::CombustionEngine;
pub use error::{ComponentError, ComponentResult};
pub use shaft::Shaft;
