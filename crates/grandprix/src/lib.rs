//! # Grand Prix
//!
//! Live relay for a two-player, host-led quiz game.
//!
//! Each participant opens a WebSocket, says which room it wants, and is
//! seated as host or guest. From then on it sends intent messages and
//! receives the full room after every change. The room itself lives in
//! an actor from `grandprix-room`; the rules live in `grandprix-core`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use grandprix::prelude::*;
//!
//! # async fn run() -> Result<(), GrandPrixError> {
//! let catalog = Catalog::from_json(r#"{ "rounds": [] }"#)?;
//! let server = RelayServer::builder()
//!     .bind("127.0.0.1:1999")
//!     .build(Arc::new(catalog))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::RelayConfig;
pub use error::GrandPrixError;
pub use server::{RelayServer, RelayServerBuilder, ShutdownHandle};

pub mod prelude {
    pub use crate::{GrandPrixError, RelayConfig, RelayServer, RelayServerBuilder, ShutdownHandle};
    pub use grandprix_core::{Catalog, RoundCatalog, SeatPolicy};
    pub use grandprix_protocol::{Message, Role, Room, RoomCode, PROTOCOL_VERSION};
}
