//! Health probe endpoints.

use axum::routing::get;
use axum::{Json, Router};
use std::sync::OnceLock;
use std::time::Instant;

use crate::dto::HealthResponse;
use crate::state::AppState;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initializes the start time used for uptime reporting.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Creates the health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/live", get(liveness_check))
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
    })
}

/// GET /live
async fn liveness_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}
