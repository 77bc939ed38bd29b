//! Intent messages and the session frames around them.
//!
//! Every message is one JSON object tagged by `"type"`. Tags follow the
//! browser client (`"bet:placed"`, `"admin:set-coins"`, …); the shorter
//! logical names (`"place-bet"`, `"end-game"`, …) are accepted as
//! aliases when decoding.

use serde::{Deserialize, Serialize};

use crate::{Answer, ClientId, Powerup, Role, Room, RoomCode};

/// The current protocol version. The first frame a relay client sends
/// must carry it.
pub const PROTOCOL_VERSION: u32 = 1;

/// `error.code` for a missing, malformed, or wrong-version hello.
pub const ERROR_BAD_HELLO: u16 = 400;

/// `error.code` when both seats are taken and the room refuses a third
/// participant.
pub const ERROR_ROOM_FULL: u16 = 409;

/// A message exchanged between a participant and the coordinator.
///
/// Variants fall into three groups:
///
/// - **Session frames** ([`Hello`](Self::Hello), [`Welcome`](Self::Welcome),
///   [`Error`](Self::Error)): relay plumbing, never reach the reducer.
/// - **Player-scoped intents**: carry a `player` and are honored only
///   when it matches the sender's own seat.
/// - **Host intents** (including every `admin:*`): honored only from the
///   connection that owns the host seat.
///
/// [`StateRequest`](Self::StateRequest) and
/// [`StateUpdate`](Self::StateUpdate) carry snapshots and never change a
/// room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    // -- Session --

    /// Client → relay, first frame: "put me in this room".
    #[serde(rename = "session:hello")]
    Hello { version: u32, room: RoomCode },

    /// Relay → client: the seat this connection was given.
    #[serde(rename = "session:welcome")]
    Welcome {
        room: RoomCode,
        role: Role,
        connection: ClientId,
    },

    /// Relay → client: the hello was refused.
    #[serde(rename = "error")]
    Error { code: u16, message: String },

    // -- Player-scoped --

    #[serde(rename = "player:joined", alias = "join")]
    Join { player: Role, name: String },

    #[serde(rename = "player:disconnected", alias = "disconnect")]
    Disconnect { player: Role },

    #[serde(rename = "player:reconnected", alias = "reconnect")]
    Reconnect { player: Role },

    /// The amount is taken as given; clamping to `[5, coins]` is a
    /// client courtesy.
    #[serde(rename = "bet:placed", alias = "place-bet")]
    PlaceBet { player: Role, amount: i64 },

    #[serde(rename = "answer:submitted", alias = "submit-answer")]
    SubmitAnswer { player: Role, answer: Answer },

    #[serde(rename = "powerup:activated", alias = "activate-powerup")]
    ActivatePowerup { player: Role, powerup: Powerup },

    #[serde(rename = "buzzer:pressed", alias = "press-buzzer")]
    PressBuzzer { player: Role },

    // -- Host --

    #[serde(rename = "game:started", alias = "start-game")]
    StartGame,

    #[serde(rename = "question:revealed", alias = "reveal-question")]
    RevealQuestion,

    #[serde(rename = "round:advanced", alias = "advance-round")]
    AdvanceRound,

    #[serde(rename = "game:ended")]
    GameEnded,

    #[serde(rename = "admin:jump-round")]
    JumpRound { round: usize },

    #[serde(rename = "admin:jump-question")]
    JumpQuestion { question: usize },

    /// Overwrites both balances. Round results are applied this way.
    #[serde(rename = "admin:set-coins")]
    SetCoins { host: i64, guest: i64 },

    #[serde(rename = "admin:reset-powerups")]
    ResetPowerups,

    #[serde(rename = "admin:skip-question")]
    SkipQuestion,

    #[serde(rename = "admin:force-reveal")]
    ForceReveal,

    #[serde(rename = "admin:end-game", alias = "end-game")]
    EndGame,

    // -- Snapshots --

    #[serde(rename = "state:request", alias = "state-request")]
    StateRequest,

    /// A full snapshot. `revision` increases with every applied change
    /// to the room.
    #[serde(rename = "state:update", alias = "state-update")]
    StateUpdate {
        state: Box<Room>,
        #[serde(default)]
        revision: u64,
    },
}

impl Message {
    /// Wraps a snapshot for broadcast.
    pub fn state_update(room: &Room, revision: u64) -> Self {
        Self::StateUpdate {
            state: Box::new(room.clone()),
            revision,
        }
    }

    /// The seat a player-scoped message claims to act for.
    pub fn declared_player(&self) -> Option<Role> {
        match self {
            Self::Join { player, .. }
            | Self::Disconnect { player }
            | Self::Reconnect { player }
            | Self::PlaceBet { player, .. }
            | Self::SubmitAnswer { player, .. }
            | Self::ActivatePowerup { player, .. }
            | Self::PressBuzzer { player } => Some(*player),
            _ => None,
        }
    }

    /// Whether only the host seat may issue this message.
    pub fn is_host_only(&self) -> bool {
        matches!(
            self,
            Self::StartGame
                | Self::RevealQuestion
                | Self::AdvanceRound
                | Self::GameEnded
                | Self::JumpRound { .. }
                | Self::JumpQuestion { .. }
                | Self::SetCoins { .. }
                | Self::ResetPowerups
                | Self::SkipQuestion
                | Self::ForceReveal
                | Self::EndGame
        )
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "session:hello",
            Self::Welcome { .. } => "session:welcome",
            Self::Error { .. } => "error",
            Self::Join { .. } => "player:joined",
            Self::Disconnect { .. } => "player:disconnected",
            Self::Reconnect { .. } => "player:reconnected",
            Self::PlaceBet { .. } => "bet:placed",
            Self::SubmitAnswer { .. } => "answer:submitted",
            Self::ActivatePowerup { .. } => "powerup:activated",
            Self::PressBuzzer { .. } => "buzzer:pressed",
            Self::StartGame => "game:started",
            Self::RevealQuestion => "question:revealed",
            Self::AdvanceRound => "round:advanced",
            Self::GameEnded => "game:ended",
            Self::JumpRound { .. } => "admin:jump-round",
            Self::JumpQuestion { .. } => "admin:jump-question",
            Self::SetCoins { .. } => "admin:set-coins",
            Self::ResetPowerups => "admin:reset-powerups",
            Self::SkipQuestion => "admin:skip-question",
            Self::ForceReveal => "admin:force-reveal",
            Self::EndGame => "admin:end-game",
            Self::StateRequest => "state:request",
            Self::StateUpdate { .. } => "state:update",
        }
    }
}
