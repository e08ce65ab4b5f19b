//! Unified error type for the Tandem server.

use tandem_protocol::ProtocolError;
use tandem_room::RoomError;
use tandem_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tandem` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
///
/// Room-level failures normally never reach this type: the connection
/// handler reports them to the requester as failure acknowledgments. The
/// variant exists for embedders driving a [`Broker`](tandem_room::Broker)
/// directly.
#[derive(Debug, thiserror::Error)]
pub enum TandemError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, already in a room).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_protocol::RoomKey;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let tandem_err: TandemError = err.into();
        assert!(matches!(tandem_err, TandemError::Transport(_)));
        assert!(tandem_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let tandem_err: TandemError = err.into();
        assert!(matches!(tandem_err, TandemError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomKey::from("lobby"));
        let tandem_err: TandemError = err.into();
        assert!(matches!(tandem_err, TandemError::Room(_)));
        assert!(tandem_err.to_string().contains("lobby"));
    }
}
