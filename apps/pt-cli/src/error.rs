use pt_components::ComponentError;
use pt_project::ProjectError;
use pt_sim::SimError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),
}

pub type CliResult<T> = Result<T, CliError>;
