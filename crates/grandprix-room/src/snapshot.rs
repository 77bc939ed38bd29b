use grandprix_protocol::{Message, Room};

/// A room together with the revision it was stored or broadcast at.
///
/// Revisions start at 1 and grow by one with every change, so a client
/// can drop any snapshot older than the one it already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub room: Room,
    pub revision: u64,
}

impl Snapshot {
    pub fn new(room: Room, revision: u64) -> Self {
        Self { room, revision }
    }

    /// The `state:update` frame for this snapshot.
    pub fn to_message(&self) -> Message {
        Message::state_update(&self.room, self.revision)
    }

    /// Whether `self` supersedes `other`.
    pub fn is_newer_than(&self, other: Option<&Snapshot>) -> bool {
        other.is_none_or(|o| self.revision > o.revision)
    }
}
