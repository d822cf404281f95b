//! Main server implementation.
//!
//! Orchestrates configuration, logging, the relay listeners, and
//! graceful shutdown.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use punchcard_core::config::ConfigLoader;
use punchcard_core::traits::{CardSource, StaticCardSource};
use punchcard_relay::{RelayServer, WsConfig, WsState};
use punchcard_telemetry::logging::{init_logging, LogConfig, LogFormat, LogOutput};

use crate::config::ServerConfig;
use crate::shutdown::{setup_signal_handlers, ShutdownController};

/// Server lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not yet initialized.
    Stopped,
    /// Initialization in progress.
    Starting,
    /// Listeners bound and serving.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Punchcard server.
///
/// Owns the relay listeners and coordinates startup and shutdown. There
/// is no global instance; embedders construct one and call
/// `initialize` then `run`.
pub struct PunchcardServer {
    config: ServerConfig,
    state: Arc<RwLock<ServerState>>,
    shutdown: ShutdownController,
    cards: Arc<dyn CardSource>,
    _log_guards: Vec<WorkerGuard>,
}

impl PunchcardServer {
    /// Creates a new server from configuration.
    ///
    /// Card data is served from an empty in-memory source by default;
    /// use `with_card_source` to wire a real backend.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            shutdown: ShutdownController::new(),
            cards: Arc::new(StaticCardSource::new()),
            _log_guards: Vec::new(),
        }
    }

    /// Creates a new server with a custom card source.
    #[must_use]
    pub fn with_card_source(config: ServerConfig, cards: Arc<dyn CardSource>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            shutdown: ShutdownController::new(),
            cards,
            _log_guards: Vec::new(),
        }
    }

    /// Loads, overrides, and validates configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the configuration
    /// is invalid.
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ServerError> {
        let loader = ConfigLoader::new().with_env_prefix("PUNCHCARD");
        let mut config: ServerConfig = loader
            .load_file(path)
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        config.apply_env_overrides();
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Returns the current lifecycle state.
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Returns the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Initializes logging.
    ///
    /// # Errors
    ///
    /// Returns an error if called twice or if logging setup fails.
    pub async fn initialize(&mut self) -> Result<(), ServerError> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Stopped {
                return Err(ServerError::InvalidState(
                    "Server must be stopped to initialize".to_string(),
                ));
            }
            *state = ServerState::Starting;
        }

        self.init_logging()?;
        info!("Punchcard server initialized");
        Ok(())
    }

    fn init_logging(&mut self) -> Result<(), ServerError> {
        let log_config = build_log_config(&self.config);

        let guards = init_logging(&log_config).map_err(|e| {
            ServerError::InitializationError(format!("Failed to initialize logging: {e}"))
        })?;

        self._log_guards = guards;
        info!("Logging initialized with level: {}", log_config.level);
        Ok(())
    }

    /// Runs the server until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is not initialized or the relay
    /// fails to bind or run.
    pub async fn run(&self) -> Result<(), ServerError> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Starting {
                return Err(ServerError::InvalidState(
                    "Server must be initialized before running".to_string(),
                ));
            }
            *state = ServerState::Running;
        }

        let server_section = &self.config.punchcard.server;
        let ws_state = Arc::new(WsState::new(
            WsConfig::from(&self.config.punchcard.websocket),
            self.cards.clone(),
        ));
        let relay = RelayServer::new(
            server_section.ws_addr(),
            server_section.trigger_addr(),
            ws_state,
        );

        tokio::spawn(setup_signal_handlers(self.shutdown.clone()));

        let shutdown = self.shutdown.clone();
        let result = relay
            .run_with_shutdown(async move { shutdown.wait_for_shutdown().await })
            .await
            .map_err(|e| ServerError::Runtime(e.to_string()));

        *self.state.write().await = ServerState::ShuttingDown;
        self.shutdown.mark_complete();
        info!("Punchcard server stopped");

        result
    }
}

/// Maps the service logging section onto the telemetry configuration.
fn build_log_config(config: &ServerConfig) -> LogConfig {
    let logging = &config.punchcard.logging;

    let format = if logging.format == "pretty" {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    };

    let mut outputs = Vec::new();
    if logging.stdout_enabled {
        outputs.push(LogOutput::Stdout);
    }
    if let Some(directory) = &logging.directory {
        outputs.push(LogOutput::File {
            path: directory.clone(),
            rotation: None,
        });
    }

    LogConfig {
        level: logging.level.clone(),
        format,
        outputs,
        ..LogConfig::default()
    }
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A component failed to initialize.
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// Operation attempted in the wrong lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The relay failed while running.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_starts_stopped() {
        let server = PunchcardServer::new(ServerConfig::default());
        assert_eq!(server.state().await, ServerState::Stopped);
    }

    #[tokio::test]
    async fn test_run_requires_initialization() {
        let server = PunchcardServer::new(ServerConfig::default());
        let err = server.run().await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidState(_)));
    }

    #[test]
    fn test_build_log_config_pretty_format() {
        let mut config = ServerConfig::default();
        config.punchcard.logging.format = "pretty".to_string();
        config.punchcard.logging.directory = Some("/var/log/punchcard".to_string());

        let log_config = build_log_config(&config);
        assert_eq!(log_config.format, LogFormat::Pretty);
        assert_eq!(log_config.outputs.len(), 2);
    }

    #[test]
    fn test_build_log_config_stdout_disabled() {
        let mut config = ServerConfig::default();
        config.punchcard.logging.stdout_enabled = false;

        let log_config = build_log_config(&config);
        assert!(log_config.outputs.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = PunchcardServer::load_config("/nonexistent/config.yaml");
        assert!(matches!(result, Err(ServerError::ConfigError(_))));
    }
}
