//! The room state model: one authoritative snapshot per room.
//!
//! A [`Room`] is always complete. Both seats exist from the moment the
//! room is created, even before anyone has joined or named themselves, so
//! consumers never have to handle a half-built room.

use serde::{Deserialize, Serialize};

use crate::{ClientId, Powerup, PowerupFlags, Role, RoomCode, Sides, Tyre};

/// Coins each player starts with.
pub const STARTING_COINS: i64 = 100;

/// Bet placed on each side at the start of every question.
pub const DEFAULT_BET: i64 = 10;

// ---------------------------------------------------------------------------
// Status and phase
// ---------------------------------------------------------------------------

/// Lifecycle of a game.
///
/// ```text
/// Lobby ──start──→ Playing ──(last round advanced | end)──→ Finished
///                     ↑                                        │
///                     └──────────────start (restart)───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Lobby,
    Playing,
    Finished,
}

/// Where the current question is in its betting → reveal cycle.
///
/// `Answering` and `Results` are reachable by deserialization only; no
/// message moves a room into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Betting,
    Answering,
    Reveal,
    Results,
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// A player's answer to the current question, shaped by round type.
///
/// Tagged by `"kind"` so the scoring engine can match exhaustively instead
/// of guessing at an untyped payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Answer {
    /// Free-text answer in a match ("how well do you know each other")
    /// round. Judged by the host, not compared automatically.
    Match { text: String },

    /// Numeric guess plus the risk tier it was made on.
    Confidence { guess: i64, tyre: Tyre },

    /// Index of the chosen option in a media-prediction round.
    Prediction { option: usize },

    /// Click count reached in a race round.
    Race { clicks: u32 },

    /// Words typed in a word race.
    Words { words: Vec<String> },

    /// A verdict on one of the opponent's words.
    Vote { word: String, player: Role, valid: bool },
}

// ---------------------------------------------------------------------------
// Player / Room
// ---------------------------------------------------------------------------

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name; empty until the player joins.
    pub name: String,
    /// Coin balance. Not floored: scoring may drive it below zero.
    pub coins: i64,
    pub powerups: PowerupFlags,
    pub connected: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: String::new(),
            coins: STARTING_COINS,
            powerups: PowerupFlags::full(),
            connected: false,
        }
    }
}

/// The authoritative state of one two-player game.
///
/// Field names serialize in camelCase to match the browser client; the
/// host connection is sent as `hostId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Immutable room code.
    pub id: RoomCode,

    /// Identity currently owning the host seat. Changes only through seat
    /// assignment or a host re-join.
    #[serde(rename = "hostId", alias = "hostConnectionId")]
    pub host_connection: ClientId,

    pub status: GameStatus,
    pub players: Sides<Player>,

    /// Zero-based index into the round catalog. Not clamped: an index
    /// past the catalog means "no current round".
    pub current_round: usize,
    /// Zero-based index into the current round's question list.
    pub current_question: usize,
    pub round_phase: RoundPhase,

    pub bets: Sides<i64>,
    pub answers: Sides<Option<Answer>>,
    pub active_powerups: Sides<Option<Powerup>>,

    /// First side to buzz on the current question.
    pub buzzed_player: Option<Role>,
}

impl Room {
    /// A fresh lobby with both seats empty and `host_connection` as the
    /// provisional host identity.
    pub fn new(id: RoomCode, host_connection: ClientId) -> Self {
        Self {
            id,
            host_connection,
            status: GameStatus::Lobby,
            players: Sides::both(Player::default()),
            current_round: 0,
            current_question: 0,
            round_phase: RoundPhase::Betting,
            bets: Sides::both(DEFAULT_BET),
            answers: Sides::both(None),
            active_powerups: Sides::both(None),
            buzzed_player: None,
        }
    }

    /// Restores the per-question defaults: betting phase, default bets,
    /// no answers, no buzzer, no active power-ups.
    ///
    /// Power-up availability flags are deliberately left alone.
    pub fn reset_question_state(&mut self) {
        self.round_phase = RoundPhase::Betting;
        self.bets = Sides::both(DEFAULT_BET);
        self.answers = Sides::both(None);
        self.buzzed_player = None;
        self.active_powerups = Sides::both(None);
    }

    /// Both seats currently marked connected.
    pub fn is_full(&self) -> bool {
        self.players.host.connected && self.players.guest.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(RoomCode::parse("GRID1").unwrap(), ClientId::from("conn-1"))
    }

    #[test]
    fn test_new_room_has_both_seats_with_defaults() {
        let room = room();
        for role in Role::BOTH {
            let player = &room.players[role];
            assert_eq!(player.coins, STARTING_COINS);
            assert!(!player.connected);
            assert!(player.name.is_empty());
            assert_eq!(player.powerups, PowerupFlags::full());
            assert_eq!(room.bets[role], DEFAULT_BET);
        }
        assert_eq!(room.status, GameStatus::Lobby);
        assert_eq!(room.round_phase, RoundPhase::Betting);
    }

    #[test]
    fn test_room_json_matches_client_shape() {
        let json = serde_json::to_value(room()).unwrap();
        assert_eq!(json["id"], "GRID1");
        assert_eq!(json["hostId"], "conn-1");
        assert_eq!(json["status"], "lobby");
        assert_eq!(json["currentRound"], 0);
        assert_eq!(json["roundPhase"], "betting");
        assert_eq!(json["bets"]["guest"], 10);
        assert!(json["answers"]["host"].is_null());
        assert!(json["buzzedPlayer"].is_null());
        assert_eq!(json["players"]["host"]["powerups"]["hard-tyres"], true);
    }

    #[test]
    fn test_room_accepts_host_connection_id_alias() {
        let mut json = serde_json::to_value(room()).unwrap();
        let obj = json.as_object_mut().unwrap();
        let host = obj.remove("hostId").unwrap();
        obj.insert("hostConnectionId".into(), host);
        let back: Room = serde_json::from_value(json).unwrap();
        assert_eq!(back.host_connection, ClientId::from("conn-1"));
    }

    #[test]
    fn test_reset_question_state_keeps_powerup_flags() {
        let mut room = room();
        room.players.host.powerups.spend(Powerup::Drs);
        room.active_powerups.host = Some(Powerup::Drs);
        room.bets.guest = 40;
        room.buzzed_player = Some(Role::Guest);
        room.answers.host = Some(Answer::Prediction { option: 2 });
        room.round_phase = RoundPhase::Reveal;

        room.reset_question_state();

        assert_eq!(room.active_powerups, Sides::both(None));
        assert_eq!(room.bets, Sides::both(DEFAULT_BET));
        assert_eq!(room.answers, Sides::both(None));
        assert_eq!(room.buzzed_player, None);
        assert_eq!(room.round_phase, RoundPhase::Betting);
        assert!(!room.players.host.powerups.is_available(Powerup::Drs));
    }

    #[test]
    fn test_answer_is_tagged_by_kind() {
        let answer = Answer::Confidence { guess: 7, tyre: Tyre::Soft };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "confidence", "guess": 7, "tyre": "soft" }));

        let vote: Answer = serde_json::from_str(
            r#"{"kind":"vote","word":"Fangio","player":"host","valid":true}"#,
        )
        .unwrap();
        assert_eq!(
            vote,
            Answer::Vote { word: "Fangio".into(), player: Role::Host, valid: true }
        );
    }
}
