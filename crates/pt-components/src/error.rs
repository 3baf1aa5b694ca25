//! Error types for component operations.

use pt_core::PtError;
use pt_project::ValidationError;
use pt_sim::SimError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or driving a component.
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Gear {gear} out of range (gearbox has {gears} gears)")]
    GearOutOfRange { gear: u32, gears: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error("Failed to read sample {path}: {source}")]
    SampleIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<PtError> for ComponentError {
    fn from(e: PtError) -> Self {
        match e {
            PtError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            PtError::NonPositive { what, .. } | PtError::InvalidArg { what } => {
                ComponentError::InvalidArg { what }
            }
        }
    }
}

impl From<ComponentError> for SimError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::Config(v) => SimError::Config(v),
            other => SimError::collaborator(other),
        }
    }
}
