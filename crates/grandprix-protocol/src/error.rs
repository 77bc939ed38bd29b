//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type` tag,
    /// missing fields, or values of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that is empty, too long, or contains characters that
    /// cannot be shared by hand.
    #[error("invalid room code {0:?}")]
    InvalidRoomCode(String),

    /// Well-formed data that breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
