//! The round catalog: the ordered list of rounds and their questions.
//!
//! The reducer only needs counts, so it sees the catalog through the
//! narrow [`RoundCatalog`] trait. Scoring needs the question content and
//! uses the concrete [`Catalog`].

use grandprix_protocol::{Room, Tyre};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// What the reducer needs to know about the rounds.
///
/// Implemented by [`Catalog`] and, for tests and quick setups, by plain
/// lists of per-round question counts (`[5, 5, 3, 1]`).
pub trait RoundCatalog: Send + Sync + 'static {
    /// Total number of rounds.
    fn round_count(&self) -> usize;

    /// Questions in round `round`, or `None` if the round does not exist.
    fn question_count(&self, round: usize) -> Option<usize>;
}

impl RoundCatalog for Vec<usize> {
    fn round_count(&self) -> usize {
        self.len()
    }

    fn question_count(&self, round: usize) -> Option<usize> {
        self.get(round).copied()
    }
}

impl<const N: usize> RoundCatalog for [usize; N] {
    fn round_count(&self) -> usize {
        N
    }

    fn question_count(&self, round: usize) -> Option<usize> {
        self.get(round).copied()
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A "how well do you know each other" prompt. The host judges matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuestion {
    pub question: String,
}

/// Allowed distance from the true answer for each tyre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerances {
    pub soft: i64,
    pub medium: i64,
    pub hard: i64,
}

impl Tolerances {
    pub fn for_tyre(&self, tyre: Tyre) -> i64 {
        match tyre {
            Tyre::Soft => self.soft,
            Tyre::Medium => self.medium,
            Tyre::Hard => self.hard,
        }
    }
}

/// A numeric guess with a tyre-dependent tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceQuestion {
    pub question: String,
    pub answer: i64,
    #[serde(default)]
    pub hint: String,
    pub ranges: Tolerances,
}

/// A paused clip with a multiple-choice "what happens next".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub start_time: u32,
    #[serde(default)]
    pub pause_time: u32,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct: usize,
    #[serde(default)]
    pub hint: String,
}

/// A click race to a target count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceQuestion {
    #[serde(default = "RaceQuestion::default_target")]
    pub target: u32,
}

impl RaceQuestion {
    fn default_target() -> u32 {
        50
    }
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// One round of the game, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Round {
    MrMrs {
        name: String,
        #[serde(default)]
        subtitle: String,
        questions: Vec<MatchQuestion>,
    },
    Confidence {
        name: String,
        #[serde(default)]
        subtitle: String,
        questions: Vec<ConfidenceQuestion>,
    },
    Video {
        name: String,
        #[serde(default)]
        subtitle: String,
        questions: Vec<VideoQuestion>,
    },
    Race {
        name: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        questions: Vec<RaceQuestion>,
    },
}

impl Round {
    pub fn name(&self) -> &str {
        match self {
            Self::MrMrs { name, .. }
            | Self::Confidence { name, .. }
            | Self::Video { name, .. }
            | Self::Race { name, .. } => name,
        }
    }

    pub fn question_count(&self) -> usize {
        match self {
            Self::MrMrs { questions, .. } => questions.len(),
            Self::Confidence { questions, .. } => questions.len(),
            Self::Video { questions, .. } => questions.len(),
            Self::Race { questions, .. } => questions.len(),
        }
    }

    pub fn question(&self, index: usize) -> Option<QuestionRef<'_>> {
        match self {
            Self::MrMrs { questions, .. } => questions.get(index).map(QuestionRef::Match),
            Self::Confidence { questions, .. } => {
                questions.get(index).map(QuestionRef::Confidence)
            }
            Self::Video { questions, .. } => questions.get(index).map(QuestionRef::Video),
            Self::Race { questions, .. } => questions.get(index).map(QuestionRef::Race),
        }
    }
}

/// A borrowed question of any round type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionRef<'a> {
    Match(&'a MatchQuestion),
    Confidence(&'a ConfidenceQuestion),
    Video(&'a VideoQuestion),
    Race(&'a RaceQuestion),
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The full, ordered round list for a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub rounds: Vec<Round>,
}

impl Catalog {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self { rounds }
    }

    /// Parses and validates a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Rejects questions that scoring could not evaluate.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (round, r) in self.rounds.iter().enumerate() {
            let invalid = |question: usize, reason: &str| CatalogError::Invalid {
                round,
                question,
                reason: reason.to_owned(),
            };
            match r {
                Round::Video { questions, .. } => {
                    for (i, q) in questions.iter().enumerate() {
                        if q.options.is_empty() {
                            return Err(invalid(i, "video question has no options"));
                        }
                        if q.correct >= q.options.len() {
                            return Err(invalid(i, "correct option out of range"));
                        }
                    }
                }
                Round::Confidence { questions, .. } => {
                    for (i, q) in questions.iter().enumerate() {
                        let Tolerances { soft, medium, hard } = q.ranges;
                        if soft < 0 || medium < 0 || hard < 0 {
                            return Err(invalid(i, "negative tolerance"));
                        }
                    }
                }
                Round::MrMrs { .. } | Round::Race { .. } => {}
            }
        }
        Ok(())
    }

    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    pub fn question(&self, round: usize, question: usize) -> Option<QuestionRef<'_>> {
        self.round(round)?.question(question)
    }

    /// The question the room is currently on, if its indices are in range.
    pub fn current(&self, room: &Room) -> Option<QuestionRef<'_>> {
        self.question(room.current_round, room.current_question)
    }
}

impl RoundCatalog for Catalog {
    fn round_count(&self) -> usize {
        self.rounds.len()
    }

    fn question_count(&self, round: usize) -> Option<usize> {
        self.round(round).map(Round::question_count)
    }
}
