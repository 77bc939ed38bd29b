//! Settings for the two room backings.

use std::time::Duration;

use grandprix_core::SeatPolicy;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for relay room actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// What happens to a third participant.
    pub seat_policy: SeatPolicy,

    /// Capacity of each actor's command channel. Senders wait when it is
    /// full.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            seat_policy: SeatPolicy::Reject,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Configuration for the shared-storage poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How often [`StorageSync`](crate::StorageSync) re-reads the store.
    pub poll_interval: Duration,

    /// Compare-and-swap attempts per write before giving up.
    pub max_retries: usize,

    pub seat_policy: SeatPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_retries: 16,
            seat_policy: SeatPolicy::Reject,
        }
    }
}
