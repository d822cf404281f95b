//! WebSocket server module.
//!
//! This module provides the realtime card-update channel:
//! - Connection registry mapping connections to claimed user ids
//! - Liveness monitoring with transport ping/pong and two-strike eviction
//! - Card-data fetch with fallback substitution
//! - Broadcast engine for card updates and refresh signals
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WebSocket Relay                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐         │
//! │  │ Connection  │  │ Connection  │  │ Connection  │  ...    │
//! │  │     #1      │  │     #2      │  │     #3      │         │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘         │
//! │         │                │                │                 │
//! │         └────────────────┼────────────────┘                 │
//! │                          ▼                                  │
//! │  ┌───────────────────────────────────────────────────────┐ │
//! │  │              Connection Registry                       │ │
//! │  │  - Registered connections by id, with claimed userId   │ │
//! │  │  - Liveness flags, swept by the monitor task           │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! │                          │                                  │
//! │                          ▼                                  │
//! │  ┌───────────────────────────────────────────────────────┐ │
//! │  │                   Broadcaster                          │ │
//! │  │  - card_update pushes (filtered by userId or all)      │ │
//! │  │  - refresh_data signals                                │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Client Usage
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8080/');
//!
//! ws.onopen = () => {
//!     ws.send(JSON.stringify({ type: 'register', userId: 'u-123' }));
//! };
//!
//! ws.onmessage = (event) => {
//!     const msg = JSON.parse(event.data);
//!     switch (msg.type) {
//!         case 'initial_data':
//!         case 'card_data':
//!         case 'card_update':
//!             render(msg.cards);
//!             break;
//!         case 'refresh_data':
//!             refetchCards();
//!             break;
//!     }
//! };
//!
//! // Application-level keepalive
//! setInterval(() => {
//!     ws.send(JSON.stringify({ type: 'ping' }));
//! }, 30000);
//! ```

pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod fetch;
pub mod handler;
pub mod monitor;

pub use broadcaster::CardBroadcaster;
pub use config::WsConfig;
pub use connection::{ConnectionId, ConnectionRegistry, Outbound};
pub use fetch::{FetchedCards, fallback_deck, fetch_with_fallback};
pub use handler::ws_handler;
pub use monitor::spawn_liveness_monitor;
