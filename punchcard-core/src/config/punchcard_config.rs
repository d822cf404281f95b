//! Punchcard service configuration structures.
//!
//! This module provides the main configuration structures for the realtime
//! card-update service, wired into the validation and environment-override
//! framework.

use super::traits::Validatable;
use super::validation::{EnvOverride, ValidationContext, Validator};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main service configuration.
///
/// # Example YAML
///
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   ws_port: 8080
///   trigger_port: 8081
///
/// websocket:
///   heartbeat_interval_secs: 30
///   max_queue_size: 64
///
/// logging:
///   level: "info"
///   format: "json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PunchcardConfig {
    /// Listener configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// WebSocket channel configuration.
    #[serde(default)]
    pub websocket: WebSocketSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl Validatable for PunchcardConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();

        ctx.enter("server");
        self.server.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("websocket");
        self.websocket.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("logging");
        self.logging.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.into_result()
    }
}

impl PunchcardConfig {
    /// Applies environment variable overrides to the configuration.
    ///
    /// Environment variables are prefixed with `PUNCHCARD_` and use
    /// underscores to separate nested fields.
    ///
    /// # Examples
    ///
    /// - `PUNCHCARD_SERVER_WS_PORT=9090` overrides `server.ws_port`
    /// - `PUNCHCARD_LOGGING_LEVEL=debug` overrides `logging.level`
    pub fn apply_env_overrides(&mut self) {
        self.server.apply_env_overrides("PUNCHCARD_SERVER");
        self.websocket.apply_env_overrides("PUNCHCARD_WEBSOCKET");
        self.logging.apply_env_overrides("PUNCHCARD_LOGGING");
    }
}

/// Listener configuration: where the two frontends bind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Host address to bind both listeners to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the WebSocket listener.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Port for the HTTP broadcast-trigger listener.
    #[serde(default = "default_trigger_port")]
    pub trigger_port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_ws_port() -> u16 {
    8080
}

fn default_trigger_port() -> u16 {
    8081
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            ws_port: default_ws_port(),
            trigger_port: default_trigger_port(),
        }
    }
}

impl ServerSection {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        let mut validator = Validator::new(ctx);

        validator
            .require_non_empty("host", &self.host)
            .in_range("ws_port", &self.ws_port, &1, &65535)
            .in_range("trigger_port", &self.trigger_port, &1, &65535)
            .custom(
                "trigger_port",
                || self.ws_port != self.trigger_port,
                "trigger_port must differ from ws_port",
            );
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_HOST"), &mut self.host);
        EnvOverride::apply_number(&format!("{prefix}_WS_PORT"), &mut self.ws_port);
        EnvOverride::apply_number(&format!("{prefix}_TRIGGER_PORT"), &mut self.trigger_port);
    }

    /// Returns the WebSocket listener address as "host:port".
    #[must_use]
    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.host, self.ws_port)
    }

    /// Returns the trigger listener address as "host:port".
    #[must_use]
    pub fn trigger_addr(&self) -> String {
        format!("{}:{}", self.host, self.trigger_port)
    }
}

/// WebSocket channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketSection {
    /// Seconds between liveness sweeps.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Per-connection outbound queue capacity.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

fn default_max_queue_size() -> usize {
    64
}

impl Default for WebSocketSection {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            max_queue_size: default_max_queue_size(),
        }
    }
}

impl WebSocketSection {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        let mut validator = Validator::new(ctx);

        validator
            .in_range(
                "heartbeat_interval_secs",
                &self.heartbeat_interval_secs,
                &1,
                &3600,
            )
            .in_range("max_queue_size", &self.max_queue_size, &1, &65536);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_number(
            &format!("{prefix}_HEARTBEAT_INTERVAL_SECS"),
            &mut self.heartbeat_interval_secs,
        );
        EnvOverride::apply_number(&format!("{prefix}_MAX_QUEUE_SIZE"), &mut self.max_queue_size);
    }

    /// Returns the heartbeat interval as a Duration.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log output directory for rotated files, if file logging is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Whether to also log to stdout.
    #[serde(default = "default_stdout_enabled")]
    pub stdout_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_stdout_enabled() -> bool {
    true
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
            stdout_enabled: default_stdout_enabled(),
        }
    }
}

impl LoggingSection {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        let mut validator = Validator::new(ctx);

        validator
            .custom(
                "level",
                || matches!(self.level.as_str(), "trace" | "debug" | "info" | "warn" | "error"),
                "Must be one of: trace, debug, info, warn, error",
            )
            .custom(
                "format",
                || matches!(self.format.as_str(), "json" | "pretty"),
                "Must be one of: json, pretty",
            );
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_LEVEL"), &mut self.level);
        EnvOverride::apply_string(&format!("{prefix}_FORMAT"), &mut self.format);
        EnvOverride::apply_bool(&format!("{prefix}_STDOUT_ENABLED"), &mut self.stdout_enabled);
        if let Ok(dir) = std::env::var(format!("{prefix}_DIRECTORY")) {
            self.directory = Some(dir);
        }
    }
}
