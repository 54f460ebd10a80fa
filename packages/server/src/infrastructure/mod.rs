//! Infrastructure layer: transport adapters and wire formats.

pub mod dto;
pub mod message_pusher;
