//! Loading configuration files from disk.

use std::io::Write;

use extrinsic_watch::config::{load_config, validate_config, ConfigError, LogFormat};
use extrinsic_watch::watcher::WatchOptions;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        [node]
        url = "wss://testnet-rpc.tangle.tools"
        connect_timeout_secs = 10

        [watch]
        wait_for_finalized = true
        timeout_secs = 0

        [logging]
        filter = "extrinsic_watch=debug"
        format = "json"
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.node.url, "wss://testnet-rpc.tangle.tools");
    assert_eq!(config.node.connect_timeout_secs, 10);
    assert!(config.watch.wait_for_finalized);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(WatchOptions::from(&config.watch).timeout, None);
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_config("");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.node.url, "ws://127.0.0.1:9944");
    assert!(!config.watch.wait_for_finalized);
}

#[test]
fn test_validation_errors_are_reported_together() {
    let file = write_config(
        r#"
        [node]
        url = "http://127.0.0.1:9933"
        connect_timeout_secs = 0
        "#,
    );

    let config = load_config(file.path()).unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert_eq!(errors.len(), 2);
    let rendered = ConfigError::Validation(errors).to_string();
    assert!(rendered.starts_with("Validation failed: node.url"));
    assert!(rendered.contains("node.connect_timeout_secs"));
}

#[test]
fn test_override_repairs_invalid_file_value() {
    let file = write_config(
        r#"
        [node]
        url = "http://127.0.0.1:9933"
        "#,
    );

    let mut config = load_config(file.path()).unwrap();
    assert!(validate_config(&config).is_err());

    config.node.url = "ws://127.0.0.1:9944".to_string();
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_parse_error() {
    let file = write_config("[watch]\ntimeout_secs = \"soon\"\n");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file() {
    let result = load_config(std::path::Path::new("/nonexistent/extrinsic-watch.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
