//! pt-core: stable foundation for the powertrain simulator.
//!
//! Contains:
//! - units (uom SI types, rpm/rad-per-second conversions, display constants)
//! - numeric (finite/positive checks, table interpolation)
//! - timing (wall-clock timers for frame profiling)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{PtError, PtResult};
pub use numeric::*;
pub use units::*;
