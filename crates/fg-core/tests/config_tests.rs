//! Integration tests for configuration loading

use fg_core::config::{Config, LogFormat};
use fg_core::Error;
use std::path::PathBuf;

#[test]
fn test_load_full_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[general]
name = "laptop"
stats_interval_secs = 0

[store]
path = "/var/lib/focusguard/blocklist.toml"
seed_defaults = false

[tunnel]
buffer_size = 1500
poll_interval_ms = 25

[sync]
reload_interval_secs = 30

[logging]
level = "debug"
format = "json"
file = "/var/log/focusguard.log"
"#,
    )
    .unwrap();

    let config = Config::load(&path).expect("Failed to load");
    config.validate().expect("Config should be valid");

    assert_eq!(config.general.name, "laptop");
    assert_eq!(config.general.stats_interval_secs, 0);
    assert_eq!(
        config.store.path,
        Some(PathBuf::from("/var/lib/focusguard/blocklist.toml"))
    );
    assert!(!config.store.seed_defaults);
    assert_eq!(config.tunnel.buffer_size, 1500);
    assert_eq!(config.tunnel.poll_interval_ms, 25);
    assert_eq!(config.sync.reload_interval_secs, 30);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/focusguard.log")));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let config = Config::from_toml("[sync]\nreload_interval_secs = 10\n").unwrap();

    assert_eq!(config.sync.reload_interval_secs, 10);
    assert!(config.store.seed_defaults);
    assert_eq!(config.tunnel.buffer_size, 32767);
    assert_eq!(config.logging.format, LogFormat::Text);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[test]
fn test_malformed_file() {
    let err = Config::from_toml("[tunnel\nbuffer_size = 1").unwrap_err();
    assert!(matches!(err, Error::TomlParse(_)));
}

#[test]
fn test_unknown_log_format_rejected() {
    assert!(Config::from_toml("[logging]\nformat = \"xml\"\n").is_err());
}

#[test]
fn test_generated_file_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut original = Config::default();
    original.general.name = "desk".to_string();
    original.store.seed_defaults = false;
    std::fs::write(&path, original.to_toml().unwrap()).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.general.name, "desk");
    assert!(!loaded.store.seed_defaults);
    assert!(loaded.validate().is_ok());
}
