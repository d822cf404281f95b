//! Relay server implementation.
//!
//! Runs the two listeners side by side: the WebSocket endpoint for
//! client apps and the HTTP broadcast trigger for the rest of the
//! platform.

use axum::{routing::any, Router};
use futures::FutureExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::RelayError;
use crate::state::WsState;
use crate::trigger::trigger_router;
use crate::ws::{spawn_liveness_monitor, ws_handler};

/// Relay server.
pub struct RelayServer {
    /// WebSocket listener address
    ws_addr: String,
    /// Trigger listener address
    trigger_addr: String,
    /// Shared relay state
    state: Arc<WsState>,
}

impl RelayServer {
    /// Creates a new relay server.
    #[must_use]
    pub fn new(
        ws_addr: impl Into<String>,
        trigger_addr: impl Into<String>,
        state: Arc<WsState>,
    ) -> Self {
        Self {
            ws_addr: ws_addr.into(),
            trigger_addr: trigger_addr.into(),
            state,
        }
    }

    /// Returns a reference to the shared state.
    #[must_use]
    pub fn state(&self) -> &Arc<WsState> {
        &self.state
    }

    /// Runs both listeners until they close.
    ///
    /// # Errors
    ///
    /// Returns an error if either listener fails to bind or run.
    pub async fn run(self) -> Result<(), RelayError> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs both listeners with graceful shutdown.
    ///
    /// The liveness monitor starts alongside the listeners and stops
    /// when the server returns.
    ///
    /// # Errors
    ///
    /// Returns an error if either listener fails to bind or run.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), RelayError> {
        let ws_app = Router::new()
            .route("/", any(ws_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone());
        let trigger_app = trigger_router(self.state.clone());

        let ws_listener = bind(&self.ws_addr).await?;
        let trigger_listener = bind(&self.trigger_addr).await?;

        info!("WebSocket server listening on {}", self.ws_addr);
        info!("Broadcast trigger listening on {}", self.trigger_addr);

        let monitor = spawn_liveness_monitor(
            self.state.registry.clone(),
            self.state.config.heartbeat_interval(),
        );

        // One shutdown signal fans out to both listeners.
        let shutdown = shutdown_signal.shared();

        let result = tokio::try_join!(
            async {
                axum::serve(ws_listener, ws_app)
                    .with_graceful_shutdown(shutdown.clone())
                    .await
                    .map_err(|e| RelayError::Internal(format!("WebSocket server error: {e}")))
            },
            async {
                axum::serve(trigger_listener, trigger_app)
                    .with_graceful_shutdown(shutdown.clone())
                    .await
                    .map_err(|e| RelayError::Internal(format!("Trigger server error: {e}")))
            },
        );

        monitor.abort();
        warn!("Relay server shutting down");

        result.map(|_| ())
    }
}

async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| RelayError::Internal(format!("Invalid bind address: {e}")))?;

    TcpListener::bind(socket_addr)
        .await
        .map_err(|e| RelayError::Internal(format!("Failed to bind to {addr}: {e}")))
}
