//! # Punchcard Telemetry
//!
//! Structured logging for the Punchcard realtime sync service.
//!
//! This crate provides:
//! - Structured logging with JSON and pretty formats
//! - Log rotation and file management
//! - `RUST_LOG` environment filter support

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Logging configuration and initialization
pub mod logging;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::logging::{init_logging, LogConfig, LogFormat, LogOutput};
}
