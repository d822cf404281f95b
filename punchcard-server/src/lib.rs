//! # Punchcard Server
//!
//! Main server entry point for the Punchcard realtime sync service.
//!
//! This crate provides:
//! - Service startup and initialization
//! - Configuration loading and validation
//! - Logging initialization
//! - Graceful shutdown handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::{PunchcardServer, ServerState};
pub use shutdown::ShutdownController;
