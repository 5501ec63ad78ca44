//! Bucketed dedup decision endpoint.

use axum::extract::State;
use axum::{Extension, Json};

use tr_core::store::DedupStore;

use crate::dto::{ThrottleRequest, ThrottleResponse};
use crate::error::ApiError;
use crate::middleware::AccessToken;
use crate::state::AppState;

/// POST /throttle
///
/// Answers whether the action is permitted: the first claim on a
/// `(entity, object type, object id)` identity within the active bucket
/// window is allowed, repeats within the window are not.
pub async fn throttle(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Json(request): Json<ThrottleRequest>,
) -> Result<Json<ThrottleResponse>, ApiError> {
    let client = state
        .builder
        .build(token.0.as_deref())
        .map_err(|err| ApiError::ClientInit(err.to_string()))?;

    let dedup = DedupStore::new(client.object_store(), state.clock.clone());
    let exists = dedup
        .check_and_claim(
            &request.internal_entity_id,
            &request.dedup_obj_type,
            &request.dedup_obj_id,
            &request.time_bucket,
        )
        .await?;

    Ok(Json(ThrottleResponse { allowed: !exists }))
}

#[cfg(test)]
mod tests {
    use crate::testutils::{body_json, error_message, post_json, test_app, test_app_at};
    use axum::http::StatusCode;
    use serde_json::json;

    fn throttle_request(bucket: &str) -> serde_json::Value {
        json!({
            "internal_entity_id": "e",
            "dedup_obj_type": "alert",
            "dedup_obj_id": "a1",
            "time_bucket": bucket,
        })
    }

    #[tokio::test]
    async fn test_first_seen_allowed_then_denied() {
        let (_builder, app) = test_app();

        let response = post_json(app.clone(), "/throttle", throttle_request("forever")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"allowed": true}));

        let response = post_json(app, "/throttle", throttle_request("forever")).await;
        assert_eq!(body_json(response).await, json!({"allowed": false}));
    }

    #[tokio::test]
    async fn test_distinct_objects_are_independent() {
        let (_builder, app) = test_app();

        post_json(app.clone(), "/throttle", throttle_request("forever")).await;

        let mut other = throttle_request("forever");
        other["dedup_obj_id"] = json!("a2");
        let response = post_json(app, "/throttle", other).await;
        assert_eq!(body_json(response).await, json!({"allowed": true}));
    }

    #[tokio::test]
    async fn test_unknown_bucket_rejected_with_accepted_values() {
        let (_builder, app) = test_app();

        let response = post_json(app, "/throttle", throttle_request("10 minutes")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error_message(response).await,
            "unsupported time bucket value: 10 minutes (must be one of: forever, 5 minutes, 30 minutes)"
        );
    }

    #[tokio::test]
    async fn test_five_minute_boundary_resets_permission() {
        let (builder, before) = test_app_at("2023-05-15T10:19:59.999Z");

        let response = post_json(before, "/throttle", throttle_request("5 minutes")).await;
        assert_eq!(body_json(response).await, json!({"allowed": true}));

        // Same identity, same store, clock one tick past the boundary.
        let after = crate::testutils::app_with_clock(&builder, "2023-05-15T10:20:00Z");
        let response = post_json(after, "/throttle", throttle_request("5 minutes")).await;
        assert_eq!(body_json(response).await, json!({"allowed": true}));
    }

    #[tokio::test]
    async fn test_same_window_is_throttled() {
        let (builder, first) = test_app_at("2023-05-15T10:31:00Z");

        post_json(first, "/throttle", throttle_request("30 minutes")).await;

        let later = crate::testutils::app_with_clock(&builder, "2023-05-15T10:59:59Z");
        let response = post_json(later, "/throttle", throttle_request("30 minutes")).await;
        assert_eq!(body_json(response).await, json!({"allowed": false}));
    }

    #[tokio::test]
    async fn test_storage_outage_is_surfaced() {
        let (builder, app) = test_app();
        builder.store().fail_next_get("kv outage").await;

        let response = post_json(app, "/throttle", throttle_request("forever")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = error_message(response).await;
        assert!(message.contains("failed to check dedup record"));
        assert!(message.contains("kv outage"));
    }

    #[tokio::test]
    async fn test_client_init_failure_is_surfaced() {
        let (builder, app) = test_app();
        builder.fail_next_build("no credentials");

        let response = post_json(app, "/throttle", throttle_request("forever")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_message(response)
            .await
            .starts_with("error creating Falcon client:"));
    }
}
