//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the node URL is a WebSocket endpoint
//! - Validate value ranges (connect timeout > 0)
//! - Validate the log filter directive parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::WatcherConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a loaded configuration, collecting every problem.
pub fn validate_config(config: &WatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.node.url) {
        Ok(url) => {
            if url.scheme() != "ws" && url.scheme() != "wss" {
                errors.push(ValidationError::new(
                    "node.url",
                    format!("scheme must be ws or wss, got '{}'", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::new("node.url", "missing host"));
            }
        }
        Err(e) => errors.push(ValidationError::new("node.url", e.to_string())),
    }

    if config.node.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "node.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(ValidationError::new("logging.filter", e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WatcherConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WatcherConfig::default();
        config.node.url = "http://127.0.0.1:9933".to_string();
        config.node.connect_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "node.url");
        assert!(errors[0].message.contains("http"));
        assert_eq!(errors[1].field, "node.connect_timeout_secs");
    }

    #[test]
    fn test_unparseable_url() {
        let mut config = WatcherConfig::default();
        config.node.url = "not a url".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "node.url");
    }

    #[test]
    fn test_wss_accepted() {
        let mut config = WatcherConfig::default();
        config.node.url = "wss://rpc.tangle.tools:443".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
