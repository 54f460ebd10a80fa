//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `type`. Relayed payloads are kept
//! as raw JSON and never inspected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Enter a category's matching queue (`waiting` is accepted for older clients)
    #[serde(alias = "waiting")]
    JoinCategory {
        #[serde(default)]
        category: Option<String>,
    },
    /// Leave the current peer and match again
    Next {
        #[serde(default)]
        category: Option<String>,
    },
    Offer {
        room: String,
        #[serde(default)]
        payload: Value,
    },
    Answer {
        room: String,
        #[serde(default)]
        payload: Value,
    },
    IceCandidate {
        room: String,
        #[serde(default)]
        payload: Value,
    },
    ChatMessage {
        room: String,
        #[serde(default)]
        payload: Value,
    },
}

/// Frames sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First frame on every connection
    Connected { connection_id: String },
    /// Paired; `room` must be echoed on every relayed frame
    Ready { room: String },
    /// The peer sent `next` or disconnected
    PeerLeft,
    Offer { payload: Value },
    Answer { payload: Value },
    IceCandidate { payload: Value },
    ChatMessage { payload: Value },
}
