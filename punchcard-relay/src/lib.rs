//! # Punchcard Relay
//!
//! WebSocket relay and HTTP broadcast trigger for the Punchcard realtime
//! sync service.
//!
//! This crate provides:
//! - WebSocket server with a per-user connection registry
//! - Liveness monitoring with ping/pong eviction
//! - Card-data fetch with fallback substitution
//! - Broadcast engine for card updates and refresh signals
//! - HTTP trigger endpoint so the rest of the platform can request
//!   broadcasts without holding a WebSocket connection
//!
//! # Architecture
//!
//! Two listeners run side by side:
//! - `ws://host:8080/` - WebSocket endpoint for client apps
//! - `http://host:8081/broadcast-refresh` - broadcast trigger
//!
//! Clients register with `{"type":"register","userId":"..."}` and then
//! receive `card_update` and `refresh_data` pushes scoped to that user id.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod server;
pub mod state;
pub mod trigger;
pub mod ws;

pub use error::RelayError;
pub use server::RelayServer;
pub use state::WsState;
pub use ws::{CardBroadcaster, ConnectionId, ConnectionRegistry, WsConfig};
