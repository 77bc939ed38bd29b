//! Wire protocol for Grand Prix rooms.
//!
//! This crate defines what travels between participants and the session
//! coordinator:
//!
//! - **Identity and per-side types** ([`Role`], [`RoomCode`],
//!   [`ClientId`], [`Sides`], [`Powerup`]).
//! - **Room state** ([`Room`], [`Player`], [`Answer`]): the single
//!   authoritative snapshot that is rebroadcast after every change.
//! - **Messages** ([`Message`]): intent messages from participants plus
//!   the few session-level frames the relay needs.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//!
//! The protocol layer has no behavior of its own. Deciding what a
//! message does to a room is the job of `grandprix-core`.
//!
//! ```text
//! Transport (frames) → Protocol (Message) → Core (apply) → Room
//! ```

mod codec;
mod error;
mod message;
mod state;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{Message, ERROR_BAD_HELLO, ERROR_ROOM_FULL, PROTOCOL_VERSION};
pub use state::{
    Answer, GameStatus, Player, Room, RoundPhase, DEFAULT_BET, STARTING_COINS,
};
pub use types::{ClientId, Powerup, PowerupFlags, Role, RoomCode, Sides, Tyre};
