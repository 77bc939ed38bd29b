//! Error types for the core.
//!
//! The reducer itself has no error type: a message it cannot honor leaves
//! the room unchanged.

use grandprix_protocol::RoomCode;

/// Seat assignment refused the requester.
#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    /// Both seats are connected and the requester is not the host.
    #[error("room {0} is full")]
    RoomFull(RoomCode),
}

/// A round catalog that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog JSON did not parse.
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog parsed but contains an unusable question.
    #[error("round {round}, question {question}: {reason}")]
    Invalid {
        round: usize,
        question: usize,
        reason: String,
    },
}
