//! Room coordination for Grand Prix.
//!
//! Two backings share one reducer and one seat-assignment routine from
//! `grandprix-core`:
//!
//! - **Relay**: each room runs as an isolated Tokio task (actor model)
//!   that owns the room, applies messages in arrival order, and
//!   broadcasts every new snapshot to the attached clients.
//! - **Shared storage**: each client reads and writes the room through a
//!   [`SharedStore`] with compare-and-swap, and polls it for changes.
//!
//! # Key types
//!
//! - [`RoomManager`]: finds or spawns the actor for a room code
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Snapshot`]: a room plus its revision
//! - [`StorageSync`]: the polling client over a [`SharedStore`]
//! - [`RoomConfig`] / [`StorageConfig`]: settings for each backing

mod config;
mod error;
mod manager;
mod room;
mod snapshot;
mod storage;

pub use config::{RoomConfig, StorageConfig};
pub use error::{RoomError, StoreError};
pub use manager::RoomManager;
pub use room::{ClientSender, RoomHandle};
pub use snapshot::Snapshot;
pub use storage::{CasOutcome, MemoryStore, SharedStore, StorageSync};
