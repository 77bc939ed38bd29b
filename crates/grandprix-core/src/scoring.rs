//! Coin deltas for each round type.
//!
//! Scoring never mutates a room. Each function reads the bets, answers
//! and active power-ups of the current question and returns a
//! [`CoinDelta`]; the host turns that into a coin correction with
//! [`CoinDelta::settle`] and sends it like any other message.
//!
//! Every delta passes through [`apply_modifiers`]: DRS doubles it, then
//! hard tyres halve a loss and trim a gain to three quarters.

use grandprix_protocol::{Answer, Message, Powerup, Role, Room, Sides, Tyre};

use crate::{Catalog, ConfidenceQuestion, QuestionRef};

/// Flat reward for winning a click race.
pub const RACE_BONUS: i64 = 50;

/// Reward per valid word in a word race.
pub const WORD_VALUE: i64 = 10;

/// Coin change for each seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoinDelta {
    pub host: i64,
    pub guest: i64,
}

impl CoinDelta {
    pub fn new(host: i64, guest: i64) -> Self {
        Self { host, guest }
    }

    /// The coin correction that applies this delta to `room`.
    pub fn settle(&self, room: &Room) -> Message {
        Message::SetCoins {
            host: room.players.host.coins.saturating_add(self.host),
            guest: room.players.guest.coins.saturating_add(self.guest),
        }
    }
}

impl From<Sides<i64>> for CoinDelta {
    fn from(sides: Sides<i64>) -> Self {
        Self::new(sides.host, sides.guest)
    }
}

/// The host's verdict on a Mr & Mrs question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Both,
    HostOnly,
    GuestOnly,
    Neither,
}

impl MatchOutcome {
    fn matched(self, role: Role) -> bool {
        matches!(
            (self, role),
            (Self::Both, _) | (Self::HostOnly, Role::Host) | (Self::GuestOnly, Role::Guest)
        )
    }
}

/// Adjusts a raw delta for the player's active power-up.
pub fn apply_modifiers(delta: i64, bet: i64, active: Option<Powerup>) -> i64 {
    let mut delta = delta;
    if active == Some(Powerup::Drs) {
        delta = delta.saturating_mul(2);
    }
    if active == Some(Powerup::HardTyres) {
        delta = if delta < 0 {
            (bet / 2).saturating_neg()
        } else {
            delta.saturating_mul(3) / 4
        };
    }
    delta
}

fn per_side(room: &Room, mut raw: impl FnMut(Role, i64) -> i64) -> CoinDelta {
    let sides = Sides::new(Role::Host, Role::Guest).map(|_, role| {
        let bet = room.bets[role];
        apply_modifiers(raw(role, bet), bet, room.active_powerups[role])
    });
    sides.into()
}

/// A matched answer wins the bet, a miss loses it.
pub fn score_match(room: &Room, outcome: MatchOutcome) -> CoinDelta {
    per_side(room, |role, bet| if outcome.matched(role) { bet } else { bet.saturating_neg() })
}

fn tyre_multiplier(tyre: Tyre) -> i64 {
    match tyre {
        Tyre::Soft => 3,
        Tyre::Medium => 2,
        Tyre::Hard => 1,
    }
}

/// A guess within the tyre's tolerance wins the bet times the tyre
/// multiplier; anything else, including no answer, loses the bet.
pub fn score_confidence(room: &Room, question: &ConfidenceQuestion) -> CoinDelta {
    per_side(room, |role, bet| match &room.answers[role] {
        Some(Answer::Confidence { guess, tyre }) => {
            let tolerance = question.ranges.for_tyre(*tyre);
            if guess.abs_diff(question.answer) <= tolerance.unsigned_abs() {
                bet.saturating_mul(tyre_multiplier(*tyre))
            } else {
                bet.saturating_neg()
            }
        }
        _ => bet.saturating_neg(),
    })
}

/// A correct prediction wins the bet. The player who buzzed first plays
/// for one and a half times the bet, win or lose.
pub fn score_prediction(room: &Room, correct: usize) -> CoinDelta {
    per_side(room, |role, bet| {
        let stake = if room.buzzed_player == Some(role) {
            bet.saturating_mul(3) / 2
        } else {
            bet
        };
        match &room.answers[role] {
            Some(Answer::Prediction { option }) if *option == correct => stake,
            _ => stake.saturating_neg(),
        }
    })
}

/// The side with strictly more clicks earns [`RACE_BONUS`]. A tie pays
/// nobody.
pub fn score_race(room: &Room) -> CoinDelta {
    let clicks = |role: Role| match &room.answers[role] {
        Some(Answer::Race { clicks }) => *clicks,
        _ => 0,
    };
    per_side(room, |role, _| {
        if clicks(role) > clicks(role.other()) { RACE_BONUS } else { 0 }
    })
}

/// [`WORD_VALUE`] per word the other side accepted.
pub fn score_word_race(room: &Room, valid_words: Sides<usize>) -> CoinDelta {
    per_side(room, |role, _| {
        i64::try_from(valid_words[role])
            .unwrap_or(i64::MAX)
            .saturating_mul(WORD_VALUE)
    })
}

/// Scores the room's current question from the catalog.
///
/// Mr & Mrs questions need the host's verdict in `outcome`; without it,
/// or when the room is not on a catalog question, there is nothing to
/// score.
pub fn score_current(
    room: &Room,
    catalog: &Catalog,
    outcome: Option<MatchOutcome>,
) -> Option<CoinDelta> {
    match catalog.current(room)? {
        QuestionRef::Match(_) => outcome.map(|o| score_match(room, o)),
        QuestionRef::Confidence(q) => Some(score_confidence(room, q)),
        QuestionRef::Video(q) => Some(score_prediction(room, q.correct)),
        QuestionRef::Race(_) => Some(score_race(room)),
    }
}
