//! Liveness monitor task.
//!
//! A single background task sweeps the registry on a fixed interval.
//! Each sweep clears every entry's liveness flag and sends a transport
//! ping; entries whose flag was still cleared from the previous sweep
//! are terminated and removed. Two silent intervals therefore drop a
//! connection.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::connection::ConnectionRegistry;

/// Spawns the liveness monitor. Aborting the handle stops monitoring;
/// registered connections are then never evicted, so keep it running
/// for the life of the relay.
pub fn spawn_liveness_monitor(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so fresh
        // registrations get a full interval before the first probe.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            debug!(
                connections = registry.connection_count(),
                "Running liveness sweep"
            );
            registry.sweep();
        }
    })
}
