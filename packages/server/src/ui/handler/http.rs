//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use deai_shared::time::{Clock, timestamp_to_rfc3339};

use crate::{infrastructure::dto::http::StatsDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current connection, room and waiting-pool counts
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    let stats = state.get_stats_usecase.execute().await;
    let generated_at = timestamp_to_rfc3339(state.clock.now_millis());

    Json(StatsDto::from_stats(stats, generated_at))
}
