//! Error types for stepping and collaborator lifecycle.

use pt_core::PtError;
use pt_project::ValidationError;
use thiserror::Error;

/// Errors surfaced by the stepper and its collaborators.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Configuration error: {0}")]
    Config(#[from] ValidationError),

    /// A collaborator's own error, passed through untouched.
    #[error("{0}")]
    Collaborator(Box<dyn std::error::Error + Send + Sync>),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn collaborator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SimError::Collaborator(Box::new(err))
    }
}

impl From<PtError> for SimError {
    fn from(e: PtError) -> Self {
        match e {
            PtError::NonFinite { what, .. } => SimError::NonPhysical { what },
            PtError::NonPositive { what, .. } | PtError::InvalidArg { what } => {
                SimError::InvalidArg { what }
            }
        }
    }
}
