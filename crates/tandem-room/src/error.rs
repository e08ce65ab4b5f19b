//! Error types for the room core.

use tandem_protocol::RoomKey;

/// Errors that can occur during room operations.
///
/// All of these are recoverable: they are reported to the requesting
/// connection as a failure acknowledgment and never affect other
/// connections or rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Creation collided with an existing room identifier.
    #[error("room {0} already exists")]
    AlreadyExists(RoomKey),

    /// The identifier is not a legal room name. The payload is the raw
    /// JSON text of the offending value.
    #[error("invalid room id: {0}")]
    InvalidId(String),

    /// The join targeted a room that does not exist.
    #[error("room {0} not found")]
    NotFound(RoomKey),

    /// The requester is already a member of the room it asked for.
    #[error("already in room {0}")]
    AlreadyInRoom(RoomKey),

    /// The requester is already a member of a different room.
    #[error("already in another room ({0})")]
    InRoomElsewhere(RoomKey),

    /// The room is at capacity.
    #[error("room {0} is full")]
    Full(RoomKey),
}
