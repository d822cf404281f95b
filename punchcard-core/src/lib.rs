//! # Punchcard Core
//!
//! Core types and interfaces for the Punchcard realtime sync service.
//!
//! This crate provides:
//! - `NewType` wrappers and transfer objects (`UserId`, `CardView`)
//! - The JSON wire protocol spoken between relay and clients
//! - Error types and handling framework
//! - The `CardSource` trait (the persistence seam)
//! - Configuration management with YAML/TOML support and environment
//!   variable overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

/// Core type definitions and `NewType` wrappers
pub mod types;

/// Wire protocol message definitions
pub mod protocol;

/// Error types and handling
pub mod error;

/// Core trait definitions
pub mod traits;

/// Configuration management
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::protocol::*;
    pub use crate::traits::*;
    pub use crate::types::*;
}
