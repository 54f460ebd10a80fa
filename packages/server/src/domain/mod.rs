//! Domain layer for the signaling server.
//!
//! This module contains the matchmaking and session routing rules, independent
//! of the WebSocket transport and of data transfer objects (DTOs).

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod matchmaker;
pub mod message_pusher;
pub mod session_router;
pub mod value_object;

pub use entity::{Room, Session, SessionState};
pub use error::{MatchError, MessagePushError, SessionError, ValueObjectError};
pub use event::{ClientRequest, Delivery, ServerEvent, SignalKind};
pub use factory::{ConnectionIdFactory, RoomIdFactory};
pub use matchmaker::{Matchmaker, Pairing, WaitingPool};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use session_router::{RouterStats, SessionRouter};
pub use value_object::{Category, ConnectionId, RoomId, Timestamp};
