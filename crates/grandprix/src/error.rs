//! Unified error type for the relay.

use grandprix_core::CatalogError;
use grandprix_protocol::ProtocolError;
use grandprix_room::RoomError;
use grandprix_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GrandPrixError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad hello).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The round catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use grandprix_core::SeatError;
    use grandprix_protocol::RoomCode;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let err: GrandPrixError = err.into();
        assert!(matches!(err, GrandPrixError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GrandPrixError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, GrandPrixError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error_keeps_message() {
        let code = RoomCode::parse("FULL").unwrap();
        let err: GrandPrixError = RoomError::Seat(SeatError::RoomFull(code)).into();
        assert!(matches!(err, GrandPrixError::Room(_)));
        assert_eq!(err.to_string(), "room FULL is full");
    }

    #[test]
    fn test_from_catalog_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GrandPrixError = CatalogError::Parse(parse).into();
        assert!(matches!(err, GrandPrixError::Catalog(_)));
    }
}
