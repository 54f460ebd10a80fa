//! Domain entities: sessions and rooms.

use serde::Serialize;

use super::{Category, ConnectionId, RoomId, Timestamp};

/// Lifecycle state of a session, derived from its fields and pool membership.
///
/// `Terminated` has no representation: a disconnected session is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// No room and not waiting
    Idle,
    /// In a category's waiting pool
    Waiting,
    /// In a room with exactly one peer
    Paired,
}

/// Per-connection session state owned by the Session Router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    /// Category of the last join or next request
    pub current_category: Option<Category>,
    /// Room the connection is currently paired in
    pub current_room: Option<RoomId>,
}

impl Session {
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            connected_at,
            current_category: None,
            current_room: None,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.current_room.is_some()
    }
}

/// Ephemeral two-party room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub category: Category,
    /// Requester first, waiter second
    pub members: [ConnectionId; 2],
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(
        id: RoomId,
        category: Category,
        requester: ConnectionId,
        waiter: ConnectionId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            category,
            members: [requester, waiter],
            created_at,
        }
    }

    pub fn has_member(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    /// The other member of the room, or `None` if `id` is not a member.
    pub fn peer_of(&self, id: &ConnectionId) -> Option<&ConnectionId> {
        match &self.members {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }
}
