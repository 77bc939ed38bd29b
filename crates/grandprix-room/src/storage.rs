//! The shared-storage backing.
//!
//! There is no coordinator here. Every client runs the reducer itself
//! and writes the result back to a store that all clients of a room can
//! see, then polls the store to pick up the other side's writes.
//!
//! Writes go through compare-and-swap on the stored revision: a client
//! that loses the race reloads, re-applies its message to the newer
//! room, and tries again. Nothing is lost to a read-modify-write race.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use grandprix_core::{apply, assign_role, RoundCatalog, Sender};
use grandprix_protocol::{ClientId, Message, Role, Room, RoomCode};
use rand::Rng;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{Snapshot, StorageConfig, StoreError};

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The write landed; this is the stored snapshot.
    Stored(Snapshot),
    /// Another writer got there first; this is what is stored now.
    Conflict(Option<Snapshot>),
}

/// A key-value store holding one versioned room per code.
pub trait SharedStore: Send + Sync + 'static {
    fn load(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<Snapshot>, StoreError>> + Send;

    /// Stores `room` under `code` if the current revision is `expected`
    /// (`None` meaning no room stored yet). A successful write bumps the
    /// revision by one.
    fn compare_and_swap(
        &self,
        code: &RoomCode,
        expected: Option<u64>,
        room: Room,
    ) -> impl Future<Output = Result<CasOutcome, StoreError>> + Send;
}

/// An in-process [`SharedStore`]. Clones share the same rooms.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rooms: Arc<Mutex<HashMap<RoomCode, Snapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a room, as if its storage entry were cleared.
    pub async fn remove(&self, code: &RoomCode) -> Option<Snapshot> {
        self.rooms.lock().await.remove(code)
    }
}

impl SharedStore for MemoryStore {
    async fn load(&self, code: &RoomCode) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.rooms.lock().await.get(code).cloned())
    }

    async fn compare_and_swap(
        &self,
        code: &RoomCode,
        expected: Option<u64>,
        room: Room,
    ) -> Result<CasOutcome, StoreError> {
        let mut rooms = self.rooms.lock().await;
        let current = rooms.get(code);
        if current.map(|s| s.revision) != expected {
            return Ok(CasOutcome::Conflict(current.cloned()));
        }
        let snapshot = Snapshot::new(room, expected.unwrap_or(0) + 1);
        rooms.insert(code.clone(), snapshot.clone());
        Ok(CasOutcome::Stored(snapshot))
    }
}

/// One client's view of a room in a [`SharedStore`].
///
/// ```text
/// connect ──► seat assigned, role memoized
/// send(msg) ──► load → apply → compare_and_swap (retry on conflict)
/// poll / spawn_poller ──► load → publish if newer
/// ```
pub struct StorageSync<S: SharedStore> {
    store: Arc<S>,
    code: RoomCode,
    client: ClientId,
    catalog: Arc<dyn RoundCatalog>,
    config: StorageConfig,
    role: OnceLock<Role>,
    latest: watch::Sender<Option<Snapshot>>,
    closed: AtomicBool,
}

impl<S: SharedStore> StorageSync<S> {
    /// A client with a freshly generated identity.
    pub fn new(
        store: Arc<S>,
        code: RoomCode,
        catalog: Arc<dyn RoundCatalog>,
        config: StorageConfig,
    ) -> Self {
        let client = ClientId::new(format!("client-{:016x}", rand::rng().random::<u64>()));
        Self::with_client_id(store, code, client, catalog, config)
    }

    pub fn with_client_id(
        store: Arc<S>,
        code: RoomCode,
        client: ClientId,
        catalog: Arc<dyn RoundCatalog>,
        config: StorageConfig,
    ) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            store,
            code,
            client,
            catalog,
            config,
            role: OnceLock::new(),
            latest,
            closed: AtomicBool::new(false),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// The seat assigned by [`connect`](Self::connect), if any.
    pub fn role(&self) -> Option<Role> {
        self.role.get().copied()
    }

    /// The newest snapshot this client has seen.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.latest.borrow().clone()
    }

    /// Receives every newer snapshot this client observes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.latest.subscribe()
    }

    /// Seats this client, creating the room if needed.
    ///
    /// The role is decided once; later calls return it without touching
    /// the store.
    pub async fn connect(&self) -> Result<Role, StoreError> {
        if let Some(role) = self.role() {
            return Ok(role);
        }

        let mut current = self.store.load(&self.code).await?;
        for attempt in 1..=self.config.max_retries {
            let expected = current.as_ref().map(|s| s.revision);
            let mut slot = current.map(|s| s.room);
            let role = assign_role(&mut slot, &self.code, &self.client, self.config.seat_policy)?;
            let Some(room) = slot else {
                return Err(StoreError::NotFound(self.code.clone()));
            };

            match self.store.compare_and_swap(&self.code, expected, room).await? {
                CasOutcome::Stored(snapshot) => {
                    let role = *self.role.get_or_init(|| role);
                    tracing::info!(
                        room = %self.code,
                        client = %self.client,
                        %role,
                        revision = snapshot.revision,
                        "seated via shared storage"
                    );
                    self.publish(snapshot);
                    return Ok(role);
                }
                CasOutcome::Conflict(latest) => {
                    tracing::debug!(room = %self.code, attempt, "seat write conflicted, retrying");
                    current = latest;
                }
            }
        }
        Err(self.contention())
    }

    /// Applies `msg` as this client and writes the result.
    ///
    /// Returns the snapshot the message was applied to, or the new one
    /// if it changed the room. A message the reducer ignores causes no
    /// write.
    pub async fn send(&self, msg: Message) -> Result<Snapshot, StoreError> {
        let role = self
            .role()
            .ok_or_else(|| StoreError::NotSeated(self.client.clone(), self.code.clone()))?;
        if msg == Message::StateRequest {
            return self
                .poll()
                .await?
                .ok_or_else(|| StoreError::NotFound(self.code.clone()));
        }

        let sender = Sender::new(self.client.clone(), role);
        let mut current = self.store.load(&self.code).await?;
        for attempt in 1..=self.config.max_retries {
            let Some(snapshot) = current else {
                return Err(StoreError::NotFound(self.code.clone()));
            };
            let next = apply(&snapshot.room, &msg, &sender, self.catalog.as_ref());
            if next == snapshot.room {
                self.publish(snapshot.clone());
                return Ok(snapshot);
            }

            match self
                .store
                .compare_and_swap(&self.code, Some(snapshot.revision), next)
                .await?
            {
                CasOutcome::Stored(stored) => {
                    tracing::debug!(
                        room = %self.code,
                        client = %self.client,
                        kind = msg.kind(),
                        revision = stored.revision,
                        "room written"
                    );
                    self.publish(stored.clone());
                    return Ok(stored);
                }
                CasOutcome::Conflict(latest) => {
                    tracing::debug!(room = %self.code, attempt, kind = msg.kind(), "write conflicted, retrying");
                    current = latest;
                }
            }
        }
        Err(self.contention())
    }

    /// Re-reads the store, publishing the room if it is newer than the
    /// last one seen.
    pub async fn poll(&self) -> Result<Option<Snapshot>, StoreError> {
        let loaded = self.store.load(&self.code).await?;
        if let Some(snapshot) = &loaded {
            self.publish(snapshot.clone());
        }
        Ok(loaded)
    }

    /// Marks this client's seat disconnected and stops any poller.
    pub async fn disconnect(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        let Some(role) = self.role() else {
            return Ok(());
        };
        self.send(Message::Disconnect { player: role }).await?;
        tracing::info!(room = %self.code, client = %self.client, %role, "disconnected");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn publish(&self, snapshot: Snapshot) {
        self.latest.send_if_modified(|latest| {
            if snapshot.is_newer_than(latest.as_ref()) {
                *latest = Some(snapshot);
                true
            } else {
                false
            }
        });
    }

    fn contention(&self) -> StoreError {
        tracing::warn!(room = %self.code, client = %self.client, "gave up after repeated write conflicts");
        StoreError::Contention {
            room: self.code.clone(),
            attempts: self.config.max_retries,
        }
    }
}

impl<S: SharedStore> StorageSync<S> {
    /// Polls the store every `poll_interval` until
    /// [`disconnect`](Self::disconnect) is called or the client is
    /// dropped.
    pub fn spawn_poller(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.config.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(sync) = weak.upgrade() else {
                    break;
                };
                if sync.is_closed() {
                    break;
                }
                if let Err(e) = sync.poll().await {
                    tracing::warn!(room = %sync.code, error = %e, "poll failed");
                }
            }
        })
    }
}
