//! Liveness endpoints.

use axum::http::StatusCode;

/// Root handler, used by hosting platforms as a liveness probe.
pub async fn root_handler() -> (StatusCode, &'static str) {
    (
        StatusCode::OK,
        "GitHub to Discord webhook relay server is running!",
    )
}

/// Manual check that routing works.
pub async fn test_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Test endpoint working!")
}
