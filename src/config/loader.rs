//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::WatcherConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file.
///
/// Only syntax is checked here. Callers apply their overrides first and then
/// run [`validate_config`](crate::config::validate_config) on the result.
pub fn load_config(path: &Path) -> Result<WatcherConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: WatcherConfig = toml::from_str(&content)?;
    Ok(config)
}
