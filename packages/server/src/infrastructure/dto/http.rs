//! HTTP API response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response of `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    /// Open WebSocket connections
    pub connections: usize,
    /// Rooms currently paired
    pub rooms: usize,
    /// Waiting connections per category
    pub waiting: BTreeMap<String, usize>,
    /// RFC 3339 timestamp of the snapshot
    pub generated_at: String,
}
