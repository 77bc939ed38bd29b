//! Room actor: an isolated Tokio task that owns one room.
//!
//! Every attach, detach and message for a room goes through the actor's
//! channel, so the room is only ever touched by one task and messages
//! take effect in the order they arrive.

use std::collections::HashMap;
use std::sync::Arc;

use grandprix_core::{apply, assign_role, RoundCatalog, SeatPolicy, Sender};
use grandprix_protocol::{ClientId, Message, Role, Room, RoomCode};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError, Snapshot};

/// Channel sender for delivering snapshots to one attached client.
pub type ClientSender = mpsc::UnboundedSender<Snapshot>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Seat a client and start delivering snapshots to it.
    Attach {
        client: ClientId,
        sender: ClientSender,
        reply: oneshot::Sender<Result<(Role, Snapshot), RoomError>>,
    },

    /// Stop delivering to a client and release its seat.
    Detach {
        client: ClientId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Apply a message from an attached client.
    Message { client: ClientId, msg: Message },

    /// Request the current snapshot, if the room exists yet.
    GetSnapshot {
        reply: oneshot::Sender<Option<Snapshot>>,
    },

    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the [`RoomManager`](crate::RoomManager) holds one per
/// room code.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    /// Seats `client` and registers `sender` for future snapshots.
    ///
    /// Returns the assigned role and the snapshot at the moment of
    /// seating. Other attached clients receive that snapshot through
    /// their senders; `client` does not.
    pub async fn attach(
        &self,
        client: ClientId,
        sender: ClientSender,
    ) -> Result<(Role, Snapshot), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Attach {
                client,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Detaches `client`. Its seat is marked disconnected if it still
    /// holds it.
    pub async fn detach(&self, client: ClientId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Detach {
                client,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a message from `client` to the room (fire-and-forget).
    pub async fn send_message(&self, client: ClientId, msg: Message) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Message { client, msg })
            .await
            .map_err(|_| self.unavailable())
    }

    /// The current snapshot, or `None` before anyone has attached.
    pub async fn snapshot(&self) -> Result<Option<Snapshot>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetSnapshot { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct Attached {
    role: Role,
    sender: ClientSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    room: Option<Room>,
    revision: u64,
    clients: HashMap<ClientId, Attached>,
    catalog: Arc<dyn RoundCatalog>,
    seat_policy: SeatPolicy,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Attach {
                    client,
                    sender,
                    reply,
                } => {
                    let result = self.handle_attach(client, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Detach { client, reply } => {
                    let result = self.handle_detach(client);
                    let _ = reply.send(result);
                }
                RoomCommand::Message { client, msg } => {
                    self.handle_message(client, msg);
                }
                RoomCommand::GetSnapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.code, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    fn snapshot(&self) -> Option<Snapshot> {
        self.room
            .as_ref()
            .map(|room| Snapshot::new(room.clone(), self.revision))
    }

    fn handle_attach(
        &mut self,
        client: ClientId,
        sender: ClientSender,
    ) -> Result<(Role, Snapshot), RoomError> {
        let before = self.room.clone();
        let role = assign_role(&mut self.room, &self.code, &client, self.seat_policy)?;
        let room = self
            .room
            .clone()
            .ok_or_else(|| RoomError::Unavailable(self.code.clone()))?;

        let changed = before.as_ref() != Some(&room);
        if changed {
            self.revision += 1;
        }
        let snapshot = Snapshot::new(room, self.revision);
        if changed {
            self.broadcast_except(&snapshot, Some(&client));
        }

        self.clients.insert(client.clone(), Attached { role, sender });
        tracing::info!(
            room = %self.code,
            %client,
            %role,
            clients = self.clients.len(),
            "client attached"
        );
        Ok((role, snapshot))
    }

    fn handle_detach(&mut self, client: ClientId) -> Result<(), RoomError> {
        let Some(attached) = self.clients.remove(&client) else {
            return Err(RoomError::NotAttached(client, self.code.clone()));
        };
        tracing::info!(
            room = %self.code,
            %client,
            role = %attached.role,
            clients = self.clients.len(),
            "client detached"
        );

        // A shared guest seat stays connected while another guest holds it.
        let seat_still_held = attached.role == Role::Guest
            && self.clients.values().any(|c| c.role == Role::Guest);
        if !seat_still_held {
            let msg = Message::Disconnect {
                player: attached.role,
            };
            self.apply_from(Sender::new(client, attached.role), &msg);
        }
        Ok(())
    }

    fn handle_message(&mut self, client: ClientId, msg: Message) {
        let Some(attached) = self.clients.get(&client) else {
            tracing::warn!(room = %self.code, %client, "message from detached client, ignoring");
            return;
        };

        if msg == Message::StateRequest {
            if let Some(snapshot) = self.snapshot() {
                let _ = attached.sender.send(snapshot);
            }
            return;
        }

        let sender = Sender::new(client, attached.role);
        self.apply_from(sender, &msg);
    }

    /// Runs the reducer and broadcasts if the room changed.
    fn apply_from(&mut self, sender: Sender, msg: &Message) {
        let Some(room) = &self.room else {
            return;
        };
        let next = apply(room, msg, &sender, self.catalog.as_ref());
        if next == *room {
            return;
        }

        self.revision += 1;
        tracing::debug!(
            room = %self.code,
            client = %sender.id,
            kind = msg.kind(),
            revision = self.revision,
            "room updated"
        );
        if next.status != room.status {
            tracing::info!(room = %self.code, status = ?next.status, "game status changed");
        }
        let snapshot = Snapshot::new(next.clone(), self.revision);
        self.room = Some(next);
        self.broadcast_except(&snapshot, None);
    }

    /// Sends a snapshot to every attached client except `skip`. Silently
    /// drops for clients whose receiver is gone.
    fn broadcast_except(&self, snapshot: &Snapshot, skip: Option<&ClientId>) {
        for (id, attached) in &self.clients {
            if Some(id) != skip {
                let _ = attached.sender.send(snapshot.clone());
            }
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(
    code: RoomCode,
    catalog: Arc<dyn RoundCatalog>,
    config: &RoomConfig,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = RoomActor {
        code: code.clone(),
        room: None,
        revision: 0,
        clients: HashMap::new(),
        catalog,
        seat_policy: config.seat_policy,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
