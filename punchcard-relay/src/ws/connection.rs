//! WebSocket connection management.
//!
//! This module provides connection state tracking and management including:
//! - Connection identity and the claimed user binding
//! - Connection registry for broadcasting
//! - Liveness flags swept by the monitor task

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use punchcard_core::protocol::ServerMessage;
use punchcard_core::types::UserId;

/// Unique connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the inner ID value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Instruction sent into a connection's outbound queue.
///
/// The queue is the only handle to the socket's write half; the owning
/// task translates these into frames.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A protocol message to serialize and send as a text frame.
    Msg(ServerMessage),
    /// A transport-level ping probe.
    Ping,
    /// Forced close without a graceful handshake.
    Terminate,
}

/// State of a single registered connection.
#[derive(Debug)]
pub struct ConnectionEntry {
    /// Connection ID
    pub id: ConnectionId,
    /// Claimed user identity (unauthenticated)
    pub user_id: UserId,
    /// Liveness flag: cleared before each probe, restored on pong
    pub alive: bool,
    /// Outbound queue sender
    pub sender: mpsc::Sender<Outbound>,
}

impl ConnectionEntry {
    /// Creates a new entry, alive by definition (it just registered).
    pub fn new(id: ConnectionId, user_id: UserId, sender: mpsc::Sender<Outbound>) -> Self {
        Self {
            id,
            user_id,
            alive: true,
            sender,
        }
    }
}

/// Registry of all registered WebSocket connections.
///
/// Connections appear here only after a successful `register`; sockets
/// that never register are not tracked and not probed. Multiple entries
/// may share a user id (multi-device).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Registered connections by ID
    connections: DashMap<ConnectionId, Arc<parking_lot::RwLock<ConnectionEntry>>>,
}

impl ConnectionRegistry {
    /// Creates a new connection registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Adds a connection. Re-adding the same id replaces the entry, so a
    /// repeated `register` on a live connection rebinds its user id.
    pub fn add(&self, id: ConnectionId, user_id: UserId, sender: mpsc::Sender<Outbound>) {
        let entry = ConnectionEntry::new(id, user_id, sender);
        self.connections
            .insert(id, Arc::new(parking_lot::RwLock::new(entry)));
    }

    /// Removes a connection. Idempotent: removing an unknown or
    /// already-removed id is a no-op.
    pub fn remove(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Restores the liveness flag for a connection that answered a probe.
    pub fn mark_pong(&self, id: ConnectionId) {
        if let Some(entry) = self.connections.get(&id) {
            entry.value().write().alive = true;
        }
    }

    /// Returns the liveness flag for a connection, if registered.
    #[must_use]
    pub fn is_alive(&self, id: ConnectionId) -> Option<bool> {
        self.connections.get(&id).map(|e| e.value().read().alive)
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Snapshots the outbound senders of connections matching the filter.
    ///
    /// With no filter, every registered connection matches. The snapshot
    /// is taken before any send so broadcasts tolerate concurrent
    /// registration and removal.
    #[must_use]
    pub fn senders_for(&self, filter: Option<&UserId>) -> Vec<mpsc::Sender<Outbound>> {
        self.connections
            .iter()
            .filter_map(|entry| {
                let state = entry.value().read();
                match filter {
                    Some(user) if &state.user_id != user => None,
                    _ => Some(state.sender.clone()),
                }
            })
            .collect()
    }

    /// Runs one liveness tick over every registered connection.
    ///
    /// An entry whose flag is still cleared from the previous tick gets a
    /// `Terminate` and is removed; everyone else has their flag cleared
    /// and receives a transport ping. A pong restores the flag via
    /// [`mark_pong`](Self::mark_pong), so roughly two silent intervals
    /// drop a connection.
    ///
    /// All sends are non-blocking: a connection whose queue is full
    /// cannot delay the sweep, and a dropped probe counts as a missed
    /// one.
    pub fn sweep(&self) {
        let mut dead = Vec::new();
        let mut probes = Vec::new();

        for entry in self.connections.iter() {
            let mut state = entry.value().write();
            if state.alive {
                state.alive = false;
                probes.push(state.sender.clone());
            } else {
                dead.push((state.id, state.sender.clone()));
            }
        }

        for (id, sender) in dead {
            tracing::info!(%id, "Evicting unresponsive connection");
            let _ = sender.try_send(Outbound::Terminate);
            self.remove(id);
        }

        for sender in probes {
            let _ = sender.try_send(Outbound::Ping);
        }
    }
}
