//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// ConnectionId too long error
    #[error("ConnectionId cannot exceed {max} characters (got {actual})")]
    ConnectionIdTooLong { max: usize, actual: usize },

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// Category validation error
    #[error("Category cannot be empty")]
    CategoryEmpty,

    /// Category too long error
    #[error("Category cannot exceed {max} characters (got {actual})")]
    CategoryTooLong { max: usize, actual: usize },

    /// Category contains characters outside `[a-z0-9_-]`
    #[error("Category may only contain lowercase letters, digits, '-' and '_' (got: {0})")]
    CategoryInvalidFormat(String),
}

/// Errors returned by the Matchmaker
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A Matchmaker needs at least one category
    #[error("At least one category must be configured")]
    NoCategories,

    /// The category has no waiting pool configured
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Protocol misuse detected by the Session Router.
///
/// None of these are surfaced to clients; callers log and drop the event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session with this id is already registered
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// The connection has no session (never connected or already terminated)
    #[error("Connection '{0}' is not registered")]
    UnknownConnection(String),

    /// join-category received while the connection is in a room
    #[error("Connection '{connection_id}' is already paired in room '{room_id}'")]
    AlreadyPaired {
        connection_id: String,
        room_id: String,
    },

    /// Relay names a room the sender is not a member of
    #[error("Connection '{connection_id}' is not a member of room '{room_id}'")]
    NotRoomMember {
        connection_id: String,
        room_id: String,
    },

    /// Matching failed
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Errors related to pushing messages to connected clients
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagePushError {
    /// The target client has no registered channel
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// The channel to the client is closed
    #[error("Failed to push message: {0}")]
    PushFailed(String),

    /// The event could not be encoded for the wire
    #[error("Failed to encode message: {0}")]
    EncodeFailed(String),
}
