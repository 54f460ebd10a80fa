//! Inbound requests and outbound events of the Session Router.
//!
//! The router never talks to the transport directly. Each operation returns
//! the deliveries to perform and the use case layer pushes them.

use serde_json::Value;

use super::{Category, ConnectionId, RoomId};

/// Kind of message relayed verbatim between the two members of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    ChatMessage,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::ChatMessage => "chat-message",
        }
    }
}

/// Validated request received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    /// `None` selects the default category
    JoinCategory { category: Option<Category> },
    /// `None` keeps the current category
    Next { category: Option<Category> },
    Relay {
        room: RoomId,
        kind: SignalKind,
        payload: Value,
    },
}

/// Event addressed to a single connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// The connection has been registered under this id
    Connected { connection_id: ConnectionId },
    /// Paired into `room`
    Ready { room: RoomId },
    /// The peer left via next or disconnect
    PeerLeft,
    /// Payload relayed from the peer
    Signal { kind: SignalKind, payload: Value },
}

/// A single outbound event and its recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Delivery {
    pub fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}
