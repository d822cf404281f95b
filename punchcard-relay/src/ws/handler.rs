//! WebSocket connection handler.
//!
//! One task owns each socket: a single `select!` loop multiplexes the
//! outbound queue and inbound frames, so per-connection ordering is
//! preserved without locking the write half.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use punchcard_core::protocol::{ClientMessage, ServerMessage};
use punchcard_core::types::UserId;

use super::connection::{ConnectionId, Outbound};
use super::fetch::fetch_with_fallback;
use crate::state::WsState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles a WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let conn_id = ConnectionId::generate();
    info!(%conn_id, "Client connected");

    let (tx, mut rx) = mpsc::channel::<Outbound>(state.config.max_queue_size);
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(Outbound::Msg(msg)) => match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if ws_sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(%conn_id, error = %e, "Failed to serialize message");
                    }
                },
                Some(Outbound::Ping) => {
                    if ws_sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                // Terminate skips the close handshake on purpose: the
                // peer already failed to answer two probes.
                Some(Outbound::Terminate) | None => break,
            },
            frame = ws_receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    route_message(conn_id, &text, &tx, &state).await;
                }
                Some(Ok(Message::Binary(data))) => {
                    match std::str::from_utf8(&data) {
                        Ok(text) => route_message(conn_id, text, &tx, &state).await,
                        Err(_) => send_error(&tx, "Invalid message format"),
                    }
                }
                Some(Ok(Message::Pong(_))) => {
                    debug!(%conn_id, "Received pong");
                    state.registry.mark_pong(conn_id);
                }
                Some(Ok(Message::Ping(_))) => {
                    // The runtime queues the answering pong.
                    debug!(%conn_id, "Received ping");
                }
                Some(Ok(Message::Close(_))) => {
                    info!(%conn_id, "Client requested close");
                    break;
                }
                Some(Err(e)) => {
                    warn!(%conn_id, error = %e, "WebSocket error");
                    break;
                }
                None => break,
            },
        }
    }

    state.registry.remove(conn_id);
    info!(%conn_id, "Client disconnected");
}

/// Routes one inbound text frame.
///
/// Every failure path answers with an `error` message and leaves the
/// connection open; only transport problems close it.
///
/// Queue sends here never block: the same task drains this queue, so an
/// awaited send into a full queue could never complete.
async fn route_message(
    conn_id: ConnectionId,
    text: &str,
    tx: &mpsc::Sender<Outbound>,
    state: &Arc<WsState>,
) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Register { user_id }) => {
            handle_register(conn_id, user_id, tx, state).await;
        }
        Ok(ClientMessage::GetCard { user_id }) => {
            handle_get_card(conn_id, user_id, tx, state).await;
        }
        Ok(ClientMessage::Ping) => {
            let _ = tx.try_send(Outbound::Msg(ServerMessage::Pong));
        }
        Ok(ClientMessage::BroadcastRefresh) => {
            info!(%conn_id, "Client-requested broadcast refresh");
            state.broadcaster.broadcast_refresh(None).await;
            let _ = tx.try_send(Outbound::Msg(ServerMessage::BroadcastConfirmed));
        }
        Err(e) => {
            warn!(%conn_id, error = %e, "Failed to parse client message");
            send_error(tx, "Invalid message format");
        }
    }
}

/// Handles a `register` message: binds the claimed user id, pushes the
/// initial snapshot, then confirms registration.
async fn handle_register(
    conn_id: ConnectionId,
    user_id: Option<String>,
    tx: &mpsc::Sender<Outbound>,
    state: &Arc<WsState>,
) {
    let Some(user) = valid_user(user_id) else {
        send_error(tx, "userId is required for registration");
        return;
    };

    state.registry.add(conn_id, user.clone(), tx.clone());

    let fetched = fetch_with_fallback(state.cards.as_ref(), &user).await;
    let _ = tx.try_send(Outbound::Msg(ServerMessage::InitialData {
        cards: fetched.cards,
        source: fetched.source,
    }));
    let _ = tx.try_send(Outbound::Msg(ServerMessage::Registered {
        connection_id: conn_id.to_string(),
    }));

    info!(%conn_id, user_id = %user, "Client registered");
}

/// Handles a `get_card` snapshot request.
async fn handle_get_card(
    conn_id: ConnectionId,
    user_id: Option<String>,
    tx: &mpsc::Sender<Outbound>,
    state: &Arc<WsState>,
) {
    let Some(user) = valid_user(user_id) else {
        send_error(tx, "userId is required");
        return;
    };

    debug!(%conn_id, user_id = %user, "Card snapshot requested");
    let fetched = fetch_with_fallback(state.cards.as_ref(), &user).await;
    let _ = tx.try_send(Outbound::Msg(ServerMessage::CardData {
        cards: fetched.cards,
        source: fetched.source,
    }));
}

fn valid_user(user_id: Option<String>) -> Option<UserId> {
    user_id.and_then(|s| UserId::new(s).ok())
}

fn send_error(tx: &mpsc::Sender<Outbound>, message: &str) {
    let _ = tx.try_send(Outbound::Msg(ServerMessage::error(message)));
}
