//! Seen-store inspection.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::AppState;

/// Response body for `GET /api/v1/seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenStatus {
    /// Number of PR ids currently remembered.
    pub seen_count: usize,
    /// False while the latest write to the backing file has failed.
    pub durable: bool,
    pub backing_path: String,
}

pub async fn seen_handler(State(state): State<AppState>) -> Json<SeenStatus> {
    let store = state.store().lock();
    let status = SeenStatus {
        seen_count: store.count(),
        durable: store.is_durable(),
        backing_path: store.backing_path().display().to_string(),
    };
    Json(status)
}
