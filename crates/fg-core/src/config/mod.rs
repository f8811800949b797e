//! Configuration management for FocusGuard
//!
//! Strongly-typed TOML configuration. Every section has defaults, so an
//! empty file (or no file at all) yields a working setup.

use crate::error::{Error, Result};
use crate::packet::{IPV4_MIN_HEADER_LEN, MAX_PACKET_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General application settings
    pub general: GeneralConfig,

    /// Blocklist store settings
    pub store: StoreConfig,

    /// Tunnel I/O settings
    pub tunnel: TunnelConfig,

    /// Blocklist sync settings
    pub sync: SyncConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let buffer = self.tunnel.buffer_size;
        if !(IPV4_MIN_HEADER_LEN..=u16::MAX as usize).contains(&buffer) {
            return Err(Error::config_value(
                "tunnel.buffer_size",
                format!("Must be between {IPV4_MIN_HEADER_LEN} and 65535, got {buffer}"),
            ));
        }

        if self.tunnel.poll_interval_ms == 0 {
            return Err(Error::config_value(
                "tunnel.poll_interval_ms",
                "Must be greater than zero",
            ));
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(Error::config_value(
                "logging.level",
                format!("Unknown level '{}'", self.logging.level),
            ));
        }

        if let Some(path) = &self.store.path {
            if path.as_os_str().is_empty() {
                return Err(Error::config_value("store.path", "Must not be empty"));
            }
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Instance name shown in the startup log
    pub name: String,
    /// Interval for logging decision counters while running (0 = never)
    pub stats_interval_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            stats_interval_secs: 60,
        }
    }
}

/// Blocklist store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the blocklist file (None = platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Seed the built-in categories into an empty store
    pub seed_defaults: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed_defaults: true,
        }
    }
}

/// Tunnel I/O configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Read buffer size; frames longer than this are truncated by the read
    pub buffer_size: usize,
    /// Wait between reads when a non-blocking descriptor has nothing ready;
    /// a blocking descriptor never consults it
    pub poll_interval_ms: u64,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            buffer_size: MAX_PACKET_SIZE,
            poll_interval_ms: 100,
        }
    }
}

/// Blocklist sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Reload the matcher from the store at this interval (0 = only at startup)
    pub reload_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reload_interval_secs: 300,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON lines
    Json,
    /// Compact single-line text
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Log file path (None = stderr only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.name, "default");
        assert!(config.store.seed_defaults);
        assert!(config.store.path.is_none());
        assert_eq!(config.tunnel.buffer_size, 32767);
        assert_eq!(config.sync.reload_interval_secs, 300);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_buffer_too_small() {
        let mut config = Config::default();
        config.tunnel.buffer_size = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_buffer_too_large() {
        let mut config = Config::default();
        config.tunnel.buffer_size = 70_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_poll_interval() {
        let mut config = Config::default();
        config.tunnel.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [store]
            path = "/tmp/blocklist.toml"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/blocklist.toml")));
        assert!(config.store.seed_defaults);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.tunnel.poll_interval_ms, 100);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.sync.reload_interval_secs = 0;
        config.logging.file = Some(PathBuf::from("focusguard.log"));

        let text = config.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();

        assert_eq!(parsed.sync.reload_interval_secs, 0);
        assert_eq!(parsed.logging.file, config.logging.file);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("[tunnel]\nbuffer_size = \"big\""),
            Err(Error::TomlParse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/focusguard.toml"),
            Err(Error::ConfigNotFound { .. })
        ));
    }
}
