//! Pairing signaling relay: matches anonymous clients per category and relays
//! WebRTC negotiation and chat messages between the two members of a room.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
