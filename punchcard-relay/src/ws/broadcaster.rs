//! Broadcast engine for pushing updates to registered clients.
//!
//! Two push flavors: `card_update` carries a fresh card snapshot,
//! `refresh_data` is a content-free stale-cache signal. Both accept an
//! optional user-id filter; no filter means every registered connection.

use std::sync::Arc;
use tracing::{debug, instrument};

use punchcard_core::protocol::ServerMessage;
use punchcard_core::traits::CardSource;
use punchcard_core::types::UserId;

use super::connection::{ConnectionRegistry, Outbound};
use super::fetch::fetch_with_fallback;

/// Broadcaster for pushing card updates and refresh signals.
#[derive(Clone)]
pub struct CardBroadcaster {
    registry: Arc<ConnectionRegistry>,
    cards: Arc<dyn CardSource>,
}

impl CardBroadcaster {
    /// Creates a new broadcaster.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, cards: Arc<dyn CardSource>) -> Self {
        Self { registry, cards }
    }

    /// Broadcasts a `card_update` snapshot to matching connections.
    ///
    /// The snapshot is fetched once (fallback deck on error) and sent to
    /// every connection matching the filter. Sends are fire-and-forget:
    /// a closed or saturated peer is skipped, never an error.
    #[instrument(skip(self), fields(filter = filter.map(UserId::as_str).unwrap_or("all")))]
    pub async fn broadcast_card_update(&self, filter: Option<&UserId>) {
        debug!("Broadcasting card update");

        let fetch_user = filter
            .cloned()
            .unwrap_or_else(|| UserId::new_unchecked(""));
        let fetched = fetch_with_fallback(self.cards.as_ref(), &fetch_user).await;

        let message = ServerMessage::CardUpdate {
            cards: fetched.cards,
            source: fetched.source,
        };
        self.send_to_matching(filter, &message);
    }

    /// Broadcasts a content-free `refresh_data` signal to matching
    /// connections: "your cached view is stale, refetch through the
    /// ordinary REST path."
    #[instrument(skip(self), fields(filter = filter.map(UserId::as_str).unwrap_or("all")))]
    pub async fn broadcast_refresh(&self, filter: Option<&UserId>) {
        debug!("Broadcasting refresh signal");
        self.send_to_matching(filter, &ServerMessage::RefreshData);
    }

    // Non-blocking: a saturated or closed queue drops the message for
    // that connection instead of stalling the broadcast.
    fn send_to_matching(&self, filter: Option<&UserId>, message: &ServerMessage) {
        let senders = self.registry.senders_for(filter);
        for sender in senders {
            let _ = sender.try_send(Outbound::Msg(message.clone()));
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
    use crate::ws::connection::ConnectionId;
    use punchcard_core::traits::{FailingCardSource, StaticCardSource};
    use punchcard_core::types::DataOrigin;
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new_unchecked(id)
    }

    fn broadcaster_with(
        registry: Arc<ConnectionRegistry>,
        cards: Arc<dyn CardSource>,
    ) -> CardBroadcaster {
        CardBroadcaster::new(registry, cards)
    }

    #[tokio::test]
    async fn test_refresh_filtered() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        registry.add(ConnectionId::generate(), user("u-1"), tx1);
        registry.add(ConnectionId::generate(), user("u-2"), tx2);

        let broadcaster = broadcaster_with(registry, Arc::new(StaticCardSource::new()));
        broadcaster.broadcast_refresh(Some(&user("u-1"))).await;

        let got = rx1.recv().await.unwrap();
        assert!(matches!(
            got,
            Outbound::Msg(ServerMessage::RefreshData)
        ));
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_refresh_unfiltered_reaches_all() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        registry.add(ConnectionId::generate(), user("u-1"), tx1);
        registry.add(ConnectionId::generate(), user("u-2"), tx2);

        let broadcaster = broadcaster_with(registry, Arc::new(StaticCardSource::new()));
        broadcaster.broadcast_refresh(None).await;

        assert!(matches!(
            rx1.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
    }

    #[tokio::test]
    async fn test_card_update_fallback_tagged() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, mut rx) = mpsc::channel(8);
        registry.add(ConnectionId::generate(), user("u-1"), tx);

        let broadcaster = broadcaster_with(registry, Arc::new(FailingCardSource::new()));
        broadcaster.broadcast_card_update(Some(&user("u-1"))).await;

        match rx.recv().await.unwrap() {
            Outbound::Msg(ServerMessage::CardUpdate { cards, source }) => {
                assert_eq!(source, DataOrigin::Fallback);
                assert!(!cards.is_empty());
            }
            other => panic!("Unexpected outbound: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_broadcast_skips_saturated_queue() {
        let registry = Arc::new(ConnectionRegistry::new());

        // Stalled reader: queue of one, already full.
        let (stuck_tx, _stuck_rx) = mpsc::channel(1);
        stuck_tx.try_send(Outbound::Ping).unwrap();
        registry.add(ConnectionId::generate(), user("u-1"), stuck_tx);

        let (tx, mut rx) = mpsc::channel(8);
        registry.add(ConnectionId::generate(), user("u-2"), tx);

        let broadcaster = broadcaster_with(registry, Arc::new(StaticCardSource::new()));
        tokio::time::timeout(
            std::time::Duration::from_millis(500),
            broadcaster.broadcast_refresh(None),
        )
        .await
        .unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
    }

    #[tokio::test]
    async fn test_broadcast_no_connections() {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = broadcaster_with(registry, Arc::new(StaticCardSource::new()));

        // Should not panic with nobody registered.
        broadcaster.broadcast_refresh(None).await;
        broadcaster.broadcast_card_update(None).await;
        assert_eq!(broadcaster.connection_count(), 0);
    }
}
