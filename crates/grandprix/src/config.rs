//! Relay settings.

use std::time::Duration;

use grandprix_room::RoomConfig;
use serde::{Deserialize, Serialize};

/// Configuration for [`RelayServer`](crate::RelayServer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address to listen on.
    pub bind: String,

    /// How long a new connection has to send its hello.
    pub hello_timeout: Duration,

    /// Close a connection after this long without an inbound frame.
    /// `None` keeps quiet connections open indefinitely.
    pub idle_timeout: Option<Duration>,

    /// Settings for each room actor.
    pub room: RoomConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:1999".to_string(),
            hello_timeout: Duration::from_secs(5),
            idle_timeout: None,
            room: RoomConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use grandprix_core::SeatPolicy;

    use super::*;

    #[test]
    fn test_relay_config_default() {
        let config = RelayConfig::default();
        assert_eq!(config.bind, "127.0.0.1:1999");
        assert_eq!(config.hello_timeout, Duration::from_secs(5));
        assert!(config.idle_timeout.is_none());
        assert_eq!(config.room.seat_policy, SeatPolicy::Reject);
    }
}
