//! Wire protocol for the realtime channel.
//!
//! JSON text frames discriminated by a `type` field, shared by the relay
//! server and the client adapter. Field names keep the camelCase form the
//! mobile clients already speak (`userId`, `connectionId`).

use serde::{Deserialize, Serialize};

use crate::types::{CardView, DataOrigin};

/// Client-to-server message types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Associates this connection with a user id and requests initial data.
    Register {
        /// Claimed user identity. Optional on the wire so a missing field
        /// yields a protocol error instead of a parse error.
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    /// Requests a fresh card snapshot without re-registering.
    GetCard {
        /// Claimed user identity.
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    /// Application-level keepalive; always answered with `pong`.
    ///
    /// This is a convenience echo for clients that cannot send protocol-level
    /// control frames (e.g. browser `WebSocket`). Liveness eviction is driven
    /// by transport ping/pong, not by this message.
    Ping,
    /// Asks the server to broadcast an unfiltered refresh signal
    /// (operator/testing use).
    BroadcastRefresh,
}

/// Server-to-client message types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Card snapshot sent right after a successful `register`.
    InitialData {
        /// The user's current cards.
        cards: Vec<CardView>,
        /// Whether the payload is live or fallback data.
        source: DataOrigin,
    },
    /// Card snapshot answering a `get_card` request.
    CardData {
        /// The user's current cards.
        cards: Vec<CardView>,
        /// Whether the payload is live or fallback data.
        source: DataOrigin,
    },
    /// Server-initiated card push.
    CardUpdate {
        /// The user's current cards.
        cards: Vec<CardView>,
        /// Whether the payload is live or fallback data.
        source: DataOrigin,
    },
    /// Content-free signal: cached card data is stale, refetch through the
    /// ordinary REST path.
    RefreshData,
    /// Registration confirmation.
    Registered {
        /// The server-assigned connection identifier.
        #[serde(rename = "connectionId")]
        connection_id: String,
    },
    /// Confirmation of a client-initiated `broadcast_refresh`.
    BroadcastConfirmed,
    /// Answer to an application-level `ping`.
    Pong,
    /// Protocol error report; the connection stays open.
    Error {
        /// Human-readable description of what was wrong.
        message: String,
    },
}

impl ServerMessage {
    /// Builds the standard protocol-error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
