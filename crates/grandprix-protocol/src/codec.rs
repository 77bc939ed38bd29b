//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The relay and the shared-storage backing both persist or transmit the
//! same values ([`Message`](crate::Message), [`Room`](crate::Room)), so
//! they share one [`Codec`]. Swapping the wire format means writing another
//! implementation; nothing else changes.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task of a server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that speaks JSON, the format browser clients send.
///
/// ```rust
/// use grandprix_protocol::{Codec, JsonCodec, Message, Role};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Message::PressBuzzer { player: Role::Guest }).unwrap();
/// assert_eq!(bytes, br#"{"type":"buzzer:pressed","player":"guest"}"#);
///
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, Message::PressBuzzer { player: Role::Guest });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Message, Room, RoomCode, ClientId};

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<Message, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_room_snapshot_decodes_to_equal_room() {
        let room = Room::new(RoomCode::parse("PIT42").unwrap(), ClientId::from("conn-1"));
        let bytes = JsonCodec.encode(&room).unwrap();
        let back: Room = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(room, back);
    }
}
