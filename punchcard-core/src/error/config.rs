//! Configuration-related error types.
//!
//! This module provides error types for configuration operations including
//! missing fields, invalid values, and file access errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error type covering missing fields, invalid values,
/// and file access errors.
///
/// # Examples
///
/// ```
/// use punchcard_core::error::ConfigError;
///
/// let error = ConfigError::MissingField {
///     field: "server.ws_port".to_string(),
/// };
/// assert!(error.to_string().contains("server.ws_port"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Required configuration field is missing.
    #[error("[Config] Missing field '{field}'")]
    MissingField {
        /// Name of the missing field (dotted path).
        field: String,
    },

    /// Configuration value is invalid.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Reason why the value is invalid.
        reason: String,
    },

    /// Configuration file could not be read.
    #[error("[Config] Failed to read file '{path}': {reason}")]
    FileReadError {
        /// Path to the configuration file.
        path: String,
        /// Reason for the read failure.
        reason: String,
    },

    /// Configuration file format is invalid.
    #[error("[Config] Invalid format in '{path}': {reason}")]
    InvalidFormat {
        /// Path to the configuration file.
        path: String,
        /// Reason for the format error.
        reason: String,
    },

    /// Environment variable has invalid value.
    #[error("[Config] Invalid environment variable '{name}': {reason}")]
    InvalidEnvVar {
        /// Name of the environment variable.
        name: String,
        /// Reason why the value is invalid.
        reason: String,
    },

    /// Configuration validation failed.
    #[error("[Config] Validation failed: {reason}")]
    ValidationFailed {
        /// Reason for the validation failure.
        reason: String,
    },
}

impl ConfigError {
    /// Returns true if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the severity level of this error.
    ///
    /// Configuration problems always surface at startup, so they are
    /// uniformly fatal: the process refuses to run with a bad config.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        super::ErrorSeverity::Fatal
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a validation failure error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let error = ConfigError::missing_field("server.trigger_port");
        assert!(error.to_string().contains("server.trigger_port"));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_invalid_value() {
        let error = ConfigError::invalid_value("websocket.heartbeat_interval_secs", "cannot be 0");
        assert!(error.to_string().contains("heartbeat_interval_secs"));
        assert!(error.to_string().contains("cannot be 0"));
    }

    #[test]
    fn test_file_read_error() {
        let error = ConfigError::FileReadError {
            path: "/etc/punchcard/config.yaml".to_string(),
            reason: "Permission denied".to_string(),
        };
        assert!(error.to_string().contains("config.yaml"));
    }

    #[test]
    fn test_all_config_errors_fatal() {
        let error = ConfigError::validation("ws_port and trigger_port collide");
        assert!(error.severity().is_fatal());
    }

    #[test]
    fn test_serde_roundtrip() {
        let error = ConfigError::InvalidFormat {
            path: "config.yaml".to_string(),
            reason: "Invalid YAML syntax".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        let parsed: ConfigError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, parsed);
    }
}
