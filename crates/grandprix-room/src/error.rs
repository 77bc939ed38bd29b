//! Error types for the room layer.

use grandprix_core::SeatError;
use grandprix_protocol::{ClientId, RoomCode};

/// Errors from the relay room actor.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Seat assignment refused the client.
    #[error(transparent)]
    Seat(#[from] SeatError),

    /// The client never attached, or already detached.
    #[error("client {0} is not attached to room {1}")]
    NotAttached(ClientId, RoomCode),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

/// Errors from the shared-storage backing.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Seat assignment refused the client.
    #[error(transparent)]
    Seat(#[from] SeatError),

    /// A message was sent before [`connect`](crate::StorageSync::connect).
    #[error("client {0} has no seat in room {1}")]
    NotSeated(ClientId, RoomCode),

    /// The room disappeared from the store.
    #[error("room {0} does not exist")]
    NotFound(RoomCode),

    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("room {room}: gave up after {attempts} conflicting writes")]
    Contention { room: RoomCode, attempts: usize },

    /// The storage backend itself failed.
    #[error("store backend failed: {0}")]
    Backend(String),
}
