//! WebSocket relay configuration.

use punchcard_core::config::WebSocketSection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// WebSocket relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Seconds between liveness sweeps
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Maximum number of queued outbound messages per connection
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
            max_queue_size: default_max_queue_size(),
        }
    }
}

impl WsConfig {
    /// Returns the heartbeat interval as a Duration.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

impl From<&WebSocketSection> for WsConfig {
    fn from(section: &WebSocketSection) -> Self {
        Self {
            heartbeat_interval_secs: section.heartbeat_interval_secs,
            max_queue_size: section.max_queue_size,
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_max_queue_size() -> usize {
    64
}
