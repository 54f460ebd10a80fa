//! Shared utilities for the Deai signaling server.

pub mod logger;
pub mod time;
