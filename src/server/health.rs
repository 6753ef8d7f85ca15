//! Liveness endpoints.
//!
//! Both return 200 as long as the process is serving requests. Hosting
//! platforms probe `/` while orchestrators usually probe `/health`.

use axum::http::StatusCode;

/// Banner served at `/`.
pub const ROOT_BANNER: &str = "GitHub PR Monitor is running!";

pub async fn root_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, ROOT_BANNER)
}

/// Health check handler.
///
/// ```ignore
/// GET /health HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: text/plain
///
/// OK
/// ```
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
