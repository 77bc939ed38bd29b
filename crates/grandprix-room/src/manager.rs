//! Room manager: finds or spawns the actor for a room code.

use std::collections::HashMap;
use std::sync::Arc;

use grandprix_core::RoundCatalog;
use grandprix_protocol::RoomCode;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle};

/// Tracks the running room actors, keyed by room code.
///
/// Rooms are created lazily: the first client to ask for a code spawns
/// its actor, and the actor creates the room when that client is seated.
pub struct RoomManager {
    rooms: HashMap<RoomCode, RoomHandle>,
    catalog: Arc<dyn RoundCatalog>,
    config: RoomConfig,
}

impl RoomManager {
    pub fn new(catalog: Arc<dyn RoundCatalog>, config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Returns the handle for `code`, spawning an actor if none is
    /// running.
    ///
    /// An actor that has shut down is replaced by a fresh one, which
    /// starts with no room.
    pub fn get_or_spawn(&mut self, code: &RoomCode) -> RoomHandle {
        if let Some(handle) = self.rooms.get(code) {
            if !handle.is_closed() {
                return handle.clone();
            }
            tracing::debug!(room = %code, "replacing stopped room actor");
        }
        let handle = spawn_room(code.clone(), Arc::clone(&self.catalog), &self.config);
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, rooms = self.rooms.len(), "room spawned");
        handle
    }

    /// Returns the handle for `code` if its actor is running.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).filter(|h| !h.is_closed()).cloned()
    }

    /// Shuts down the actor for `code` and forgets the room.
    pub async fn destroy_room(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::Unavailable(code.clone()))?;
        let _ = handle.shutdown().await;
        tracing::info!(room = %code, "room destroyed");
        Ok(())
    }

    /// Returns the number of tracked rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
