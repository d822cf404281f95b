//! Shared relay state.

use std::sync::Arc;

use punchcard_core::traits::CardSource;

use crate::ws::{CardBroadcaster, ConnectionRegistry, WsConfig};

/// Shared state for the WebSocket relay and the trigger endpoint.
pub struct WsState {
    /// WebSocket configuration
    pub config: WsConfig,
    /// Connection registry
    pub registry: Arc<ConnectionRegistry>,
    /// Card snapshot source
    pub cards: Arc<dyn CardSource>,
    /// Broadcast engine over the registry
    pub broadcaster: CardBroadcaster,
}

impl WsState {
    /// Creates a new relay state.
    #[must_use]
    pub fn new(config: WsConfig, cards: Arc<dyn CardSource>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = CardBroadcaster::new(registry.clone(), cards.clone());
        Self {
            config,
            registry,
            cards,
            broadcaster,
        }
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use punchcard_core::traits::StaticCardSource;

    #[test]
    fn test_ws_state_new() {
        let state = WsState::new(WsConfig::default(), Arc::new(StaticCardSource::new()));
        assert_eq!(state.connection_count(), 0);
    }
}
