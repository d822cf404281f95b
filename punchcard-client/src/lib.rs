//! # Punchcard Client
//!
//! Reconnecting WebSocket client for the Punchcard realtime sync
//! service. Registers a user id on every (re)connect, keeps the
//! connection alive with an application-level heartbeat, and surfaces
//! card pushes and refresh signals through a callback trait.
//!
//! # Example
//!
//! ```ignore
//! use punchcard_client::{CardSyncClient, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .url("ws://localhost:8080")
//!     .user_id("u-42")
//!     .build();
//!
//! let mut client = CardSyncClient::new(config);
//! client.connect().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod client;
pub mod config;
pub mod state;

pub use client::{CardSyncCallback, CardSyncClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use state::ConnectionState;
