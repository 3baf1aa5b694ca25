use thiserror::Error;

pub type PtResult<T> = Result<T, PtError>;

/// Scalar validation failures shared by every layer above `pt-core`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PtError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// A mass, radius or inertia that must be strictly positive was not.
    #[error("{what} (got {value})")]
    NonPositive { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
