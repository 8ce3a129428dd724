//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Node connection settings.
    pub node: NodeConfig,

    /// Submission watch settings.
    pub watch: WatchConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// WebSocket JSON-RPC endpoint (e.g., "ws://127.0.0.1:9944").
    pub url: String,

    /// Accept unencrypted `ws://` endpoints that are not on localhost.
    pub allow_insecure: bool,

    /// Connection and metadata download timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9944".to_string(),
            allow_insecure: false,
            connect_timeout_secs: 30,
        }
    }
}

/// Submission watch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Wait for finalization instead of block inclusion.
    pub wait_for_finalized: bool,

    /// Deadline from broadcast to terminal status in seconds (0 = no deadline).
    pub timeout_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            wait_for_finalized: false,
            timeout_secs: 300,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "extrinsic_watch=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WatcherConfig::default();
        assert_eq!(config.node.url, "ws://127.0.0.1:9944");
        assert!(!config.node.allow_insecure);
        assert!(!config.watch.wait_for_finalized);
        assert_eq!(config.watch.timeout_secs, 300);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml() {
        let config: WatcherConfig = toml::from_str(
            r#"
            [watch]
            wait_for_finalized = true

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert!(config.watch.wait_for_finalized);
        assert_eq!(config.watch.timeout_secs, 300);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.node.connect_timeout_secs, 30);
    }
}
