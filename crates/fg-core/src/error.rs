//! Error types for fg-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.
//!
//! Two families live here. [`Error`] is the ambient error for configuration,
//! the blocklist store and the sync task. [`ParseFault`] is raised by the
//! packet and DNS parse stages and never leaves the filter engine: every
//! fault resolves to a forwarded packet at the engine boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fg-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Blocklist store could not be read or written
    #[error("Blocklist store error for '{path}': {message}")]
    Store {
        /// Path of the backing file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A pattern that can never match anything
    #[error("Invalid domain pattern: {pattern:?}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
    },

    /// Attempt to block a domain from the protected list
    #[error("Domain '{domain}' is protected and cannot be blocked")]
    ProtectedDomain {
        /// The protected domain
        domain: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Store {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Fault raised by a parse stage
///
/// Faults are data, not failures: the engine maps every one of them to a
/// forwarded packet. They are kept distinct so decisions can be logged and
/// counted by cause.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFault {
    /// Buffer shorter than the header being read
    #[error("buffer too short: need {expected} bytes, have {actual}")]
    TooShort {
        /// Minimum bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// IP version other than 4
    #[error("unsupported IP version {0}")]
    UnsupportedVersion(u8),

    /// Transport protocol that is not inspected
    #[error("unsupported transport protocol {0}")]
    UnsupportedProtocol(u8),

    /// DNS label length byte above 63 (also covers compression pointers)
    #[error("malformed DNS label length {length} at offset {offset}")]
    MalformedLabel {
        /// Offending length byte
        length: u8,
        /// Offset of the length byte within the DNS message
        offset: usize,
    },

    /// Name ran past the end of the buffer
    #[error("DNS name truncated at offset {0}")]
    Truncated(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config_value("sync.reload_interval_secs", "Must be greater than 0");
        assert!(err.to_string().contains("sync.reload_interval_secs"));
        assert!(err.to_string().contains("Must be greater than 0"));

        let err = Error::ProtectedDomain {
            domain: "google.com".to_string(),
        };
        assert!(err.to_string().contains("google.com"));
    }

    #[test]
    fn test_store_error_keeps_path() {
        let err = Error::store("/tmp/blocklist.toml", "permission denied");
        match err {
            Error::Store { path, .. } => assert_eq!(path, PathBuf::from("/tmp/blocklist.toml")),
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_parse_fault_display() {
        let fault = ParseFault::MalformedLabel {
            length: 200,
            offset: 12,
        };
        assert!(fault.to_string().contains("200"));

        let fault = ParseFault::TooShort {
            expected: 20,
            actual: 3,
        };
        assert!(fault.to_string().contains("need 20"));
    }
}
