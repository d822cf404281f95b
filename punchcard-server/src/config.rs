//! Server configuration module.
//!
//! Wraps the base service configuration with server-only settings
//! such as the graceful-shutdown timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use punchcard_core::config::{PunchcardConfig, Validatable};

/// Server configuration.
///
/// Contains all settings needed to start and run the Punchcard server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Base service configuration.
    #[serde(flatten)]
    pub punchcard: PunchcardConfig,

    /// Shutdown configuration.
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl ServerConfig {
    /// Creates a new server configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.punchcard.apply_env_overrides();
        self.shutdown.apply_env_overrides();
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.punchcard
            .validate()
            .map_err(|e| ConfigValidationError::InvalidConfig(e.to_string()))?;

        if self.shutdown.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidConfig(
                "shutdown.timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Timeout for graceful shutdown in seconds.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ShutdownConfig {
    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PUNCHCARD_SHUTDOWN_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = secs;
            }
        }
    }

    /// Returns the shutdown timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.punchcard.server.ws_port, 8080);
        assert_eq!(config.shutdown.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shutdown_config_timeout() {
        let config = ShutdownConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_shutdown_timeout_rejected() {
        let mut config = ServerConfig::default();
        config.shutdown.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.shutdown.timeout_secs, parsed.shutdown.timeout_secs);
        assert_eq!(
            config.punchcard.server.trigger_port,
            parsed.punchcard.server.trigger_port
        );
    }
}
