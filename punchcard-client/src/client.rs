//! Card sync client with automatic reconnection and heartbeat.

#![allow(clippy::too_many_lines)]

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as TungsteniteMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use punchcard_core::error::NetworkError;
use punchcard_core::protocol::{ClientMessage, ServerMessage};
use punchcard_core::types::{CardView, DataOrigin};

use crate::config::ClientConfig;
use crate::state::{ConnectionState, InternalState};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Callback trait for card sync events.
#[async_trait]
pub trait CardSyncCallback: Send + Sync {
    /// Called with the snapshot pushed right after registration.
    async fn on_initial_data(&self, cards: Vec<CardView>, source: DataOrigin);

    /// Called when the server pushes updated cards.
    async fn on_card_update(&self, cards: Vec<CardView>, source: DataOrigin);

    /// Called when the server signals that cached data is stale.
    async fn on_refresh_requested(&self);

    /// Called when the connection is established.
    async fn on_connected(&self);

    /// Called when the connection is lost or closed.
    async fn on_disconnected(&self, reason: Option<String>);

    /// Called when an error occurs.
    async fn on_error(&self, error: NetworkError);

    /// Called with a snapshot answering an explicit `get_card` request.
    async fn on_card_data(&self, cards: Vec<CardView>, source: DataOrigin) {
        let _ = (cards, source);
    }

    /// Called when registration is confirmed.
    async fn on_registered(&self, connection_id: String) {
        let _ = connection_id;
    }

    /// Called before each reconnection attempt.
    async fn on_reconnecting(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Called when reconnection attempts are exhausted. Terminal: the
    /// client makes no further attempts until `connect` is called again.
    async fn on_failed(&self) {}

    /// Called when the server reports a protocol error.
    async fn on_server_error(&self, message: String) {
        let _ = message;
    }
}

/// How a session ended, seen from the session loop.
enum SessionEnd {
    /// `close` was called; do not reconnect.
    Shutdown,
    /// The connection dropped or errored.
    Lost(String),
}

/// Card sync client.
///
/// Connects to the relay, registers the configured user id, and keeps
/// the connection alive with an application-level heartbeat. Lost
/// connections are re-established with exponential backoff, and the
/// client re-registers after every reconnect so scoped broadcasts keep
/// reaching it.
///
/// # Example
///
/// ```ignore
/// use punchcard_client::{CardSyncClient, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .url("ws://localhost:8080")
///     .user_id("u-42")
///     .build();
///
/// let mut client = CardSyncClient::new(config);
/// client.set_callback(my_callback);
/// client.connect().await?;
/// ```
pub struct CardSyncClient {
    config: ClientConfig,
    state: Arc<RwLock<InternalState>>,
    callback: Option<Arc<dyn CardSyncCallback>>,
    send_tx: Option<mpsc::Sender<ClientMessage>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl CardSyncClient {
    /// Creates a new client with the given configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(InternalState::new())),
            callback: None,
            send_tx: None,
            shutdown_tx: None,
        }
    }

    /// Sets the callback for receiving events.
    pub fn set_callback(&mut self, callback: impl CardSyncCallback + 'static) {
        self.callback = Some(Arc::new(callback));
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.read().state
    }

    /// Returns whether the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.read().state.is_connected()
    }

    /// Returns the number of reconnection attempts since the last
    /// successful connection.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.state.read().reconnect_attempts
    }

    /// Connects to the relay and starts the session task.
    ///
    /// The initial connection failing is reported as an error here;
    /// later drops are handled by the reconnect loop and surfaced
    /// through the callback.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the initial connection fails.
    pub async fn connect(&mut self) -> Result<(), NetworkError> {
        if self.is_connected() {
            return Ok(());
        }

        self.state.write().state = ConnectionState::Connecting;
        let ws = Self::dial(&self.config).await.map_err(|e| {
            self.state.write().mark_disconnected();
            e
        })?;

        let (send_tx, send_rx) = mpsc::channel::<ClientMessage>(100);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        self.send_tx = Some(send_tx);
        self.shutdown_tx = Some(shutdown_tx);

        self.state.write().mark_connected();
        if let Some(callback) = &self.callback {
            callback.on_connected().await;
        }

        info!(url = %self.config.url, user_id = %self.config.user_id, "Connected to relay");

        tokio::spawn(Self::run(
            ws,
            send_rx,
            shutdown_rx,
            Arc::clone(&self.state),
            self.callback.clone(),
            self.config.clone(),
        ));

        Ok(())
    }

    /// Closes the connection intentionally. No reconnection follows.
    pub async fn close(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(()).await;
        }
        self.send_tx = None;
        info!("Client closed");
    }

    /// Requests a fresh card snapshot for the configured user.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the client is not connected.
    pub async fn request_cards(&self) -> Result<(), NetworkError> {
        self.send(ClientMessage::GetCard {
            user_id: Some(self.config.user_id.clone()),
        })
        .await
    }

    /// Sends an application-level ping.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the client is not connected.
    pub async fn ping(&self) -> Result<(), NetworkError> {
        self.send(ClientMessage::Ping).await
    }

    /// Asks the relay to broadcast an unfiltered refresh signal.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the client is not connected.
    pub async fn request_broadcast(&self) -> Result<(), NetworkError> {
        self.send(ClientMessage::BroadcastRefresh).await
    }

    async fn send(&self, message: ClientMessage) -> Result<(), NetworkError> {
        let send_tx = self
            .send_tx
            .as_ref()
            .ok_or_else(|| NetworkError::closed("Not connected"))?;

        send_tx
            .send(message)
            .await
            .map_err(|_| NetworkError::closed("Send channel closed"))
    }

    async fn dial(config: &ClientConfig) -> Result<WsStream, NetworkError> {
        let (ws, _) = timeout(config.connect_timeout(), connect_async(&config.url))
            .await
            .map_err(|_| NetworkError::Timeout {
                timeout_ms: config.connect_timeout_ms,
            })?
            .map_err(|e| NetworkError::connection_failed(e.to_string()))?;
        Ok(ws)
    }

    /// Session task: runs sessions back to back, reconnecting with
    /// backoff between them until shutdown or exhaustion.
    async fn run(
        ws: WsStream,
        mut send_rx: mpsc::Receiver<ClientMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
        state: Arc<RwLock<InternalState>>,
        callback: Option<Arc<dyn CardSyncCallback>>,
        config: ClientConfig,
    ) {
        let mut current = Some(ws);

        loop {
            let ws = match current.take() {
                Some(ws) => ws,
                None => match Self::dial(&config).await {
                    Ok(ws) => {
                        state.write().mark_connected();
                        if let Some(cb) = &callback {
                            cb.on_connected().await;
                        }
                        info!(url = %config.url, "Reconnected to relay");
                        ws
                    }
                    Err(e) => {
                        warn!(error = %e, "Reconnection attempt failed");
                        if let Some(cb) = &callback {
                            cb.on_error(e).await;
                        }
                        if Self::backoff_or_fail(&state, &callback, &config).await {
                            continue;
                        }
                        return;
                    }
                },
            };

            let end =
                Self::run_session(ws, &mut send_rx, &mut shutdown_rx, &state, &callback, &config)
                    .await;

            match end {
                SessionEnd::Shutdown => {
                    state.write().mark_closed();
                    if let Some(cb) = &callback {
                        cb.on_disconnected(Some("Client closed".to_string())).await;
                    }
                    return;
                }
                SessionEnd::Lost(reason) => {
                    state.write().mark_disconnected();
                    if let Some(cb) = &callback {
                        cb.on_disconnected(Some(reason)).await;
                    }
                    if !Self::backoff_or_fail(&state, &callback, &config).await {
                        return;
                    }
                }
            }
        }
    }

    /// Waits out the backoff delay before the next attempt. Returns
    /// false when reconnection is disabled or exhausted; the client is
    /// then in the terminal `Failed` state.
    async fn backoff_or_fail(
        state: &Arc<RwLock<InternalState>>,
        callback: &Option<Arc<dyn CardSyncCallback>>,
        config: &ClientConfig,
    ) -> bool {
        let attempt = state.read().reconnect_attempts;
        if !config.should_reconnect(attempt) {
            warn!(
                attempts = attempt,
                "Reconnection attempts exhausted, giving up"
            );
            state.write().mark_failed();
            if let Some(cb) = callback {
                cb.on_failed().await;
            }
            return false;
        }

        let delay = config.calculate_reconnect_delay(attempt);
        warn!(
            attempt = attempt + 1,
            max_attempts = config.max_reconnect_attempts,
            delay_ms = delay.as_millis(),
            "Reconnecting"
        );
        if let Some(cb) = callback {
            cb.on_reconnecting(attempt + 1, config.max_reconnect_attempts)
                .await;
        }
        state.write().mark_reconnecting();
        tokio::time::sleep(delay).await;
        true
    }

    /// Runs one session: registers first, then multiplexes outgoing
    /// messages, incoming frames, and the heartbeat.
    async fn run_session(
        ws: WsStream,
        send_rx: &mut mpsc::Receiver<ClientMessage>,
        shutdown_rx: &mut mpsc::Receiver<()>,
        state: &Arc<RwLock<InternalState>>,
        callback: &Option<Arc<dyn CardSyncCallback>>,
        config: &ClientConfig,
    ) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();

        // Register before anything else; scoped broadcasts only reach
        // registered connections.
        let register = ClientMessage::Register {
            user_id: Some(config.user_id.clone()),
        };
        if let Err(e) = Self::send_json(&mut sink, &register).await {
            return SessionEnd::Lost(e.to_string());
        }

        let mut heartbeat = interval(config.heartbeat_interval());
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        heartbeat.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Shutdown signal received");
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }

                Some(msg) = send_rx.recv() => {
                    if let Err(e) = Self::send_json(&mut sink, &msg).await {
                        if let Some(cb) = callback {
                            cb.on_error(e.clone()).await;
                        }
                        return SessionEnd::Lost(e.to_string());
                    }
                }

                frame = stream.next() => match frame {
                    Some(Ok(TungsteniteMessage::Text(text))) => {
                        state.write().record_message();
                        Self::dispatch(&text, state, callback).await;
                    }
                    Some(Ok(TungsteniteMessage::Ping(_))) => {
                        // tungstenite queues the pong reply itself.
                        debug!("Transport ping received");
                    }
                    Some(Ok(TungsteniteMessage::Pong(_))) => {
                        debug!("Transport pong received");
                    }
                    Some(Ok(TungsteniteMessage::Close(_))) => {
                        info!("Server sent close frame");
                        return SessionEnd::Lost("Server closed connection".to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        if let Some(cb) = callback {
                            cb.on_error(NetworkError::websocket(e.to_string())).await;
                        }
                        return SessionEnd::Lost(e.to_string());
                    }
                    None => return SessionEnd::Lost("Stream ended".to_string()),
                },

                _ = heartbeat.tick() => {
                    if let Err(e) = Self::send_json(&mut sink, &ClientMessage::Ping).await {
                        return SessionEnd::Lost(e.to_string());
                    }
                    debug!("Heartbeat ping sent");
                }
            }
        }
    }

    async fn send_json<S>(sink: &mut S, message: &ClientMessage) -> Result<(), NetworkError>
    where
        S: SinkExt<TungsteniteMessage> + Unpin,
        S::Error: std::fmt::Display,
    {
        let json = serde_json::to_string(message)
            .map_err(|e| NetworkError::websocket(format!("Failed to serialize: {e}")))?;
        sink.send(TungsteniteMessage::Text(json))
            .await
            .map_err(|e| NetworkError::websocket(e.to_string()))
    }

    /// Dispatches one inbound server message to the callback.
    ///
    /// Unparseable frames are logged and dropped; the session stays up.
    async fn dispatch(
        text: &str,
        state: &Arc<RwLock<InternalState>>,
        callback: &Option<Arc<dyn CardSyncCallback>>,
    ) {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to parse server message");
                return;
            }
        };

        let Some(cb) = callback else { return };

        match message {
            ServerMessage::InitialData { cards, source } => {
                cb.on_initial_data(cards, source).await;
            }
            ServerMessage::CardData { cards, source } => {
                cb.on_card_data(cards, source).await;
            }
            ServerMessage::CardUpdate { cards, source } => {
                cb.on_card_update(cards, source).await;
            }
            ServerMessage::RefreshData => {
                cb.on_refresh_requested().await;
            }
            ServerMessage::Registered { connection_id } => {
                info!(%connection_id, "Registration confirmed");
                cb.on_registered(connection_id).await;
            }
            ServerMessage::BroadcastConfirmed => {
                debug!("Broadcast confirmed");
            }
            ServerMessage::Pong => {
                state.write().record_pong();
                debug!("Application pong received");
            }
            ServerMessage::Error { message } => {
                warn!(%message, "Server reported protocol error");
                cb.on_server_error(message).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl RecordingCallback {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: impl Into<String>) {
            self.events.lock().unwrap().push(event.into());
        }
    }

    #[async_trait]
    impl CardSyncCallback for Arc<RecordingCallback> {
        async fn on_initial_data(&self, cards: Vec<CardView>, source: DataOrigin) {
            self.push(format!("initial_data:{}:{source:?}", cards.len()));
        }

        async fn on_card_update(&self, cards: Vec<CardView>, source: DataOrigin) {
            self.push(format!("card_update:{}:{source:?}", cards.len()));
        }

        async fn on_refresh_requested(&self) {
            self.push("refresh_requested");
        }

        async fn on_connected(&self) {
            self.push("connected");
        }

        async fn on_disconnected(&self, _reason: Option<String>) {
            self.push("disconnected");
        }

        async fn on_error(&self, error: NetworkError) {
            self.push(format!("error:{error}"));
        }

        async fn on_registered(&self, connection_id: String) {
            self.push(format!("registered:{connection_id}"));
        }

        async fn on_server_error(&self, message: String) {
            self.push(format!("server_error:{message}"));
        }
    }

    fn recording() -> (
        Arc<RecordingCallback>,
        Option<Arc<dyn CardSyncCallback>>,
        Arc<RwLock<InternalState>>,
    ) {
        let recorder = Arc::new(RecordingCallback::default());
        let callback: Arc<dyn CardSyncCallback> = Arc::new(Arc::clone(&recorder));
        (
            recorder,
            Some(callback),
            Arc::new(RwLock::new(InternalState::new())),
        )
    }

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::builder()
            .url("ws://localhost:8080")
            .user_id("u-1")
            .build();

        let client = CardSyncClient::new(config);
        assert!(!client.is_connected());
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.reconnect_attempts(), 0);
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let client = CardSyncClient::new(ClientConfig::default());
        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionClosed { .. }));
    }

    #[test]
    fn test_register_message_wire_form() {
        let msg = ClientMessage::Register {
            user_id: Some("u-42".to_string()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"register","userId":"u-42"}"#);
    }

    #[tokio::test]
    async fn test_dispatch_refresh_data() {
        let (recorder, callback, state) = recording();
        CardSyncClient::dispatch(r#"{"type":"refresh_data"}"#, &state, &callback).await;
        assert_eq!(recorder.events(), vec!["refresh_requested"]);
    }

    #[tokio::test]
    async fn test_dispatch_registered() {
        let (recorder, callback, state) = recording();
        CardSyncClient::dispatch(
            r#"{"type":"registered","connectionId":"conn-3"}"#,
            &state,
            &callback,
        )
        .await;
        assert_eq!(recorder.events(), vec!["registered:conn-3"]);
    }

    #[tokio::test]
    async fn test_dispatch_card_update_with_source() {
        let (recorder, callback, state) = recording();
        CardSyncClient::dispatch(
            r#"{"type":"card_update","cards":[],"source":"fallback"}"#,
            &state,
            &callback,
        )
        .await;
        assert_eq!(recorder.events(), vec!["card_update:0:Fallback"]);
    }

    #[tokio::test]
    async fn test_dispatch_pong_records_liveness() {
        let (recorder, callback, state) = recording();
        CardSyncClient::dispatch(r#"{"type":"pong"}"#, &state, &callback).await;
        assert!(state.read().last_pong.is_some());
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_server_error() {
        let (recorder, callback, state) = recording();
        CardSyncClient::dispatch(
            r#"{"type":"error","message":"userId is required"}"#,
            &state,
            &callback,
        )
        .await;
        assert_eq!(recorder.events(), vec!["server_error:userId is required"]);
    }

    #[tokio::test]
    async fn test_dispatch_ignores_malformed_frames() {
        let (recorder, callback, state) = recording();
        CardSyncClient::dispatch("not json", &state, &callback).await;
        assert!(recorder.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_exhaustion_marks_failed() {
        let config = ClientConfig::builder()
            .max_reconnect_attempts(2)
            .reconnect_delay(std::time::Duration::from_millis(1))
            .build();
        let (recorder, callback, state) = recording();

        assert!(CardSyncClient::backoff_or_fail(&state, &callback, &config).await);
        assert!(CardSyncClient::backoff_or_fail(&state, &callback, &config).await);
        assert!(!CardSyncClient::backoff_or_fail(&state, &callback, &config).await);

        assert_eq!(state.read().state, ConnectionState::Failed);
        assert!(recorder.events().is_empty()); // on_reconnecting/on_failed use defaults
    }

    #[tokio::test]
    async fn test_reregisters_first_after_connection_loss() {
        use std::time::Duration;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept two sessions, record the first frame of each, and drop
        // the first socket right away to force a reconnect.
        let server = tokio::spawn(async move {
            let mut first_frames = Vec::new();
            for _ in 0..2 {
                let (stream, _) = listener.accept().await.unwrap();
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                let frame = ws.next().await.unwrap().unwrap();
                first_frames.push(frame.into_text().unwrap());
            }
            first_frames
        });

        let config = ClientConfig::builder()
            .url(format!("ws://{addr}"))
            .user_id("u-77")
            .reconnect_delay(Duration::from_millis(10))
            .max_reconnect_delay(Duration::from_millis(20))
            .build();
        let mut client = CardSyncClient::new(config);
        client.connect().await.unwrap();

        let frames = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        client.close().await;

        // Both sessions opened with a register for the same user.
        assert_eq!(frames.len(), 2);
        for frame in frames {
            let msg: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(msg["type"], "register");
            assert_eq!(msg["userId"], "u-77");
        }
    }

    #[tokio::test]
    async fn test_backoff_disabled_fails_immediately() {
        let config = ClientConfig::builder().reconnect_enabled(false).build();
        let (_, callback, state) = recording();

        assert!(!CardSyncClient::backoff_or_fail(&state, &callback, &config).await);
        assert_eq!(state.read().state, ConnectionState::Failed);
    }
}
