//! Per-connection handler: hello, seating, and message relay.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `session:hello` → validate version, read room code
//!   2. Attach to the room actor → role assigned (or `error` 409)
//!   3. Send `session:welcome` and the current `state:update`
//!   4. Loop: forward inbound intents to the room, outbound snapshots to
//!      the socket
//!   5. On close, detach so the seat is marked disconnected

use std::sync::Arc;

use grandprix_protocol::{
    ClientId, Codec, Message, ProtocolError, RoomCode, ERROR_BAD_HELLO, ERROR_ROOM_FULL,
    PROTOCOL_VERSION,
};
use grandprix_room::{RoomError, RoomHandle};
use grandprix_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use crate::server::ServerState;
use crate::GrandPrixError;

/// Drop guard that detaches a client from its room when the handler
/// exits.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async detach.
struct AttachGuard {
    client: ClientId,
    room: RoomHandle,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        let client = self.client.clone();
        let room = self.room.clone();
        tokio::spawn(async move {
            if let Err(e) = room.detach(client).await {
                tracing::debug!(error = %e, "detach failed");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GrandPrixError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Hello ---
    let code = perform_hello(&conn, &state).await?;
    let client = ClientId::new(conn_id.to_string());

    // --- Step 2: Seat ---
    let room = state.rooms.lock().await.get_or_spawn(&code);
    let (tx, mut outbound) = mpsc::unbounded_channel();
    let (role, snapshot) = match room.attach(client.clone(), tx).await {
        Ok(seated) => seated,
        Err(RoomError::Seat(e)) => {
            send_error(&conn, &state.codec, ERROR_ROOM_FULL, &e.to_string()).await?;
            return Err(RoomError::Seat(e).into());
        }
        Err(e) => return Err(e.into()),
    };
    let _guard = AttachGuard {
        client: client.clone(),
        room: room.clone(),
    };
    tracing::info!(%conn_id, room = %code, %role, "connection seated");

    // --- Step 3: Welcome ---
    let welcome = Message::Welcome {
        room: code.clone(),
        role,
        connection: client.clone(),
    };
    send(&conn, &state.codec, &welcome).await?;
    send(&conn, &state.codec, &snapshot.to_message()).await?;

    // --- Step 4: Relay loop ---
    let idle_timeout = state.config.idle_timeout;
    let idle = sleep(idle_timeout.unwrap_or_default());
    tokio::pin!(idle);

    loop {
        tokio::select! {
            _ = &mut idle, if idle_timeout.is_some() => {
                tracing::info!(%conn_id, room = %code, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, room = %code, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };
                if let Some(timeout) = idle_timeout {
                    idle.as_mut().reset(Instant::now() + timeout);
                }

                let msg: Message = match state.codec.decode(&data) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "dropping undecodable frame");
                        continue;
                    }
                };
                room.send_message(client.clone(), msg).await?;
            }
            snapshot = outbound.recv() => {
                let Some(snapshot) = snapshot else {
                    tracing::debug!(%conn_id, room = %code, "room stopped");
                    break;
                };
                send(&conn, &state.codec, &snapshot.to_message()).await?;
            }
        }
    }

    // _guard drops here → detach fires.
    Ok(())
}

/// Receives and validates the hello frame, answering `error` 400 if it is
/// missing, malformed, or for another protocol version.
async fn perform_hello<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
) -> Result<RoomCode, GrandPrixError> {
    let data = match tokio::time::timeout(state.config.hello_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before hello".into()).into());
        }
        Ok(Err(e)) => return Err(GrandPrixError::Transport(e)),
        Err(_) => {
            send_error(conn, &state.codec, ERROR_BAD_HELLO, "hello timed out").await?;
            return Err(ProtocolError::InvalidMessage("hello timed out".into()).into());
        }
    };

    let reason = match state.codec.decode::<Message>(&data) {
        Ok(Message::Hello { version, room }) if version == PROTOCOL_VERSION => return Ok(room),
        Ok(Message::Hello { version, .. }) => {
            format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}")
        }
        Ok(other) => format!("expected session:hello, got {}", other.kind()),
        Err(e) => format!("invalid hello: {e}"),
    };
    send_error(conn, &state.codec, ERROR_BAD_HELLO, &reason).await?;
    Err(ProtocolError::InvalidMessage(reason).into())
}

async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &Message,
) -> Result<(), GrandPrixError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends an `error` frame to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), GrandPrixError> {
    let msg = Message::Error {
        code,
        message: message.to_string(),
    };
    send(conn, codec, &msg).await
}
