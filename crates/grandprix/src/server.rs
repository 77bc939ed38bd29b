//! `RelayServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room actor → core.

use std::sync::Arc;
use std::time::Duration;

use grandprix_core::{RoundCatalog, SeatPolicy};
use grandprix_protocol::{Codec, JsonCodec};
use grandprix_room::RoomManager;
use grandprix_transport::{Transport, TransportError, WebSocketTransport};
use tokio::sync::{Mutex, Notify};

use crate::handler::handle_connection;
use crate::{GrandPrixError, RelayConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
    pub(crate) config: RelayConfig,
}

/// Builder for configuring and starting a relay.
///
/// # Example
///
/// ```rust,ignore
/// let server = RelayServer::builder()
///     .bind("0.0.0.0:1999")
///     .seat_policy(SeatPolicy::ShareGuest)
///     .build(Arc::new(catalog))
///     .await?;
/// server.run().await
/// ```
pub struct RelayServerBuilder {
    config: RelayConfig,
}

impl RelayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    pub fn seat_policy(mut self, policy: SeatPolicy) -> Self {
        self.config.room.seat_policy = policy;
        self
    }

    pub fn hello_timeout(mut self, timeout: Duration) -> Self {
        self.config.hello_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Binds the listener. Rooms index into `catalog` when advancing.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(
        self,
        catalog: Arc<dyn RoundCatalog>,
    ) -> Result<RelayServer<JsonCodec>, GrandPrixError> {
        let transport = WebSocketTransport::bind(&self.config.bind).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(catalog, self.config.room.clone())),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(RelayServer {
            transport,
            state,
            stop: Arc::new(Notify::new()),
        })
    }
}

impl Default for RelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound relay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RelayServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    stop: Arc<Notify>,
}

/// Stops a running [`RelayServer`] from another task.
///
/// Rooms and open connections are left to finish on their own; only the
/// accept loop ends.
#[derive(Clone)]
pub struct ShutdownHandle {
    stop: Arc<Notify>,
}

impl ShutdownHandle {
    /// Asks the accept loop to stop. Safe to call before `run` starts.
    pub fn shutdown(&self) {
        self.stop.notify_one();
    }
}

impl RelayServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> RelayServerBuilder {
        RelayServerBuilder::new()
    }
}

impl<C: Codec> RelayServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle that ends [`run()`](Self::run).
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Runs the accept loop, spawning a handler task per connection.
    ///
    /// Runs until the transport shuts down.
    pub async fn run(mut self) -> Result<(), GrandPrixError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "relay running");

        loop {
            let accepted = tokio::select! {
                result = self.transport.accept() => Some(result),
                _ = self.stop.notified() => None,
            };
            let Some(accepted) = accepted else {
                self.transport.shutdown().await?;
                continue;
            };
            match accepted {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(TransportError::Shutdown) => {
                    tracing::info!("relay stopped");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
