//! HTTP server for liveness probes and store inspection.
//!
//! # Endpoints
//!
//! - `GET /` - Returns a plain-text banner
//! - `GET /health` - Returns 200 if the server is running
//! - `GET /api/v1/seen` - Returns the seen-store status as JSON

pub mod health;
pub mod status;

pub use health::{health_handler, root_handler};
pub use status::{SeenStatus, seen_handler};

use crate::persistence::SharedStore;

/// Shared application state, passed to handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        AppState { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/seen", get(seen_handler))
        .with_state(app_state)
}
