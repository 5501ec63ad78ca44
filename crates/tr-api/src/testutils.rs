//! Shared helpers for handler tests.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use tr_core::bucket::FixedClock;
use tr_platform::MockClientBuilder;

use crate::routes::create_router;
use crate::state::AppState;

/// An app over fresh mock backends, with the wall clock.
pub(crate) fn test_app() -> (Arc<MockClientBuilder>, Router) {
    let builder = Arc::new(MockClientBuilder::new());
    let state = AppState::new(builder.clone());
    (builder, create_router(state))
}

/// An app over fresh mock backends with the clock pinned to `instant`.
pub(crate) fn test_app_at(instant: &str) -> (Arc<MockClientBuilder>, Router) {
    let builder = Arc::new(MockClientBuilder::new());
    let app = app_with_clock(&builder, instant);
    (builder, app)
}

/// Another app over the same backends but a different pinned clock. Lets a
/// test cross a bucket boundary against shared storage.
pub(crate) fn app_with_clock(builder: &Arc<MockClientBuilder>, instant: &str) -> Router {
    let at: DateTime<Utc> = instant.parse().expect("valid RFC 3339 timestamp");
    let state = AppState::new(builder.clone()).with_clock(Arc::new(FixedClock(at)));
    create_router(state)
}

/// Sends a JSON POST with a bearer credential attached.
pub(crate) async fn post_json(app: Router, path: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer test-token")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Reads the response body as JSON.
pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("JSON response body")
}

/// Pulls the first error message out of an error response.
pub(crate) async fn error_message(response: Response) -> String {
    let body = body_json(response).await;
    body["errors"][0]["message"]
        .as_str()
        .expect("error message present")
        .to_string()
}
