//! Structured logging system for Punchcard.
//!
//! Provides configurable logging with support for:
//! - JSON and pretty-print formats
//! - Multiple output targets (stdout, file)
//! - Log rotation

mod config;

pub use config::{LogConfig, LogFormat, LogOutput, RotationConfig};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Initialize the logging system with the given configuration.
///
/// Returns guards that must be kept alive for the duration of the
/// program to ensure all logs are flushed.
///
/// # Example
///
/// ```no_run
/// use punchcard_telemetry::logging::{init_logging, LogConfig};
///
/// let config = LogConfig::default();
/// let _guards = init_logging(&config).expect("Failed to initialize logging");
/// ```
///
/// # Errors
///
/// Returns `LoggingError` if a file output cannot be set up.
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    let mut guards = Vec::new();

    // RUST_LOG takes precedence over the configured level.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // The layer type parameter is left for inference: the layers stack
    // on top of the env filter, not directly on the registry.
    let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stdout => {
                let base = stdout_base(config);
                match config.format {
                    LogFormat::Json => layers.push(Box::new(base.json().flatten_event(true))),
                    LogFormat::Pretty => layers.push(Box::new(base.pretty())),
                }
            }
            LogOutput::File { path, rotation } => {
                let (layer, guard) = create_file_layer(config, path, rotation.as_ref());
                layers.push(Box::new(layer));
                guards.push(guard);
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    Ok(guards)
}

fn stdout_base<S>(config: &LogConfig) -> fmt::Layer<S> {
    fmt::layer()
        .with_target(true)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info)
}

fn create_file_layer<S>(
    config: &LogConfig,
    path: &str,
    rotation: Option<&RotationConfig>,
) -> (impl Layer<S>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let file_appender = rotation.map_or_else(
        || tracing_appender::rolling::daily(path, "punchcard.log"),
        |rot| match rot {
            RotationConfig::Hourly => tracing_appender::rolling::hourly(path, "punchcard.log"),
            RotationConfig::Daily => tracing_appender::rolling::daily(path, "punchcard.log"),
            RotationConfig::Never => tracing_appender::rolling::never(path, "punchcard.log"),
        },
    );

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File output is always JSON so the files stay machine-parseable.
    let layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info)
        .json()
        .flatten_event(true);

    (layer, guard)
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),
}
