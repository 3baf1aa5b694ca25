//! pt-project: configuration file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_configuration};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Relative sample paths in the file are anchored at the file's directory.
pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Configuration> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Configuration = serde_yaml::from_str(&content)?;
    finish_load(path, &mut config)?;
    Ok(config)
}

pub fn save_yaml(path: &std::path::Path, config: &Configuration) -> ProjectResult<()> {
    validate_configuration(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Configuration> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Configuration = serde_json::from_str(&content)?;
    finish_load(path, &mut config)?;
    Ok(config)
}

pub fn save_json(path: &std::path::Path, config: &Configuration) -> ProjectResult<()> {
    validate_configuration(config)?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Pick the loader by file extension; anything but `.json` is read as YAML.
pub fn load(path: &std::path::Path) -> ProjectResult<Configuration> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

fn finish_load(path: &std::path::Path, config: &mut Configuration) -> ProjectResult<()> {
    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }
    validate_configuration(config)?;
    tracing::debug!(
        path = %path.display(),
        name = %config.name,
        samples = config.sounds.samples.len(),
        "configuration loaded"
    );
    Ok(())
}
