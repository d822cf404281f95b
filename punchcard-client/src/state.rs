//! Client connection state management.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Connection state for the card sync client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Attempting to connect.
    Connecting,
    /// Successfully connected and registered.
    Connected,
    /// Attempting to reconnect.
    Reconnecting,
    /// Connection closed intentionally.
    Closed,
    /// Reconnection attempts exhausted.
    Failed,
}

impl ConnectionState {
    /// Returns true if the connection is active.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if the connection is in a transitional state.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }

    /// Returns true if the client will make no further attempts.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Closed => write!(f, "Closed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Internal state tracking for the client.
#[derive(Debug)]
pub(crate) struct InternalState {
    /// Current connection state.
    pub state: ConnectionState,
    /// Number of reconnection attempts since the last success.
    pub reconnect_attempts: u32,
    /// Last successful connection time.
    pub last_connected: Option<Instant>,
    /// Last message received time.
    pub last_message: Option<Instant>,
    /// Last application pong received time.
    pub last_pong: Option<Instant>,
}

impl Default for InternalState {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            reconnect_attempts: 0,
            last_connected: None,
            last_message: None,
            last_pong: None,
        }
    }
}

impl InternalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the connection as connected and resets the attempt counter.
    pub fn mark_connected(&mut self) {
        self.state = ConnectionState::Connected;
        self.reconnect_attempts = 0;
        self.last_connected = Some(Instant::now());
    }

    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    pub fn mark_reconnecting(&mut self) {
        self.state = ConnectionState::Reconnecting;
        self.reconnect_attempts += 1;
    }

    pub fn mark_closed(&mut self) {
        self.state = ConnectionState::Closed;
    }

    pub fn mark_failed(&mut self) {
        self.state = ConnectionState::Failed;
    }

    pub fn record_message(&mut self) {
        self.last_message = Some(Instant::now());
    }

    pub fn record_pong(&mut self) {
        self.last_pong = Some(Instant::now());
    }
}
