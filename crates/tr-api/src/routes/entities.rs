//! Entity mapping endpoints: existence check and mapping upsert.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use tr_core::models::ExternalEntityRecord;
use tr_core::store::MappingStore;

use crate::dto::{
    CheckExternalEntityRequest, CheckExternalEntityResponse, CreateEntityMappingRequest,
};
use crate::error::ApiError;
use crate::middleware::AccessToken;
use crate::state::AppState;

/// POST /check_if_ext_entity_exists
pub async fn check_external_entity(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Json(request): Json<CheckExternalEntityRequest>,
) -> Result<Json<CheckExternalEntityResponse>, ApiError> {
    let client = state
        .builder
        .build(token.0.as_deref())
        .map_err(|err| ApiError::ClientInit(err.to_string()))?;

    let mappings = MappingStore::new(client.object_store());
    let found = mappings
        .lookup(&request.internal_entity_id, &request.external_system_id)
        .await
        .map_err(|err| ApiError::TicketLookup(err.to_string()))?;

    let response = match found {
        Some(record) => CheckExternalEntityResponse::found(
            record.external_entity_id,
            record.external_system_id,
        ),
        None => CheckExternalEntityResponse::missing(),
    };

    Ok(Json(response))
}

/// POST /create_entity_mapping
pub async fn create_entity_mapping(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
    Json(request): Json<CreateEntityMappingRequest>,
) -> Result<(StatusCode, Json<ExternalEntityRecord>), ApiError> {
    let client = state
        .builder
        .build(token.0.as_deref())
        .map_err(|err| ApiError::ClientInit(err.to_string()))?;

    let record = ExternalEntityRecord {
        internal_entity_id: request.internal_entity_id,
        external_entity_id: request.external_entity_id,
        external_system_id: request.external_system_id,
    };

    let mappings = MappingStore::new(client.object_store());
    mappings.upsert(&record).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg(test)]
mod tests {
    use crate::testutils::{body_json, error_message, post_json, test_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use tr_core::store::ObjectStore;

    #[tokio::test]
    async fn test_check_on_empty_store_reports_missing() {
        let (_builder, app) = test_app();

        let response = post_json(
            app,
            "/check_if_ext_entity_exists",
            json!({"internal_entity_id": "entity123", "external_system_id": "servicenow_incident"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_check_returns_stored_identity() {
        let (builder, app) = test_app();

        let record = json!({
            "internal_entity_id": "entity123",
            "external_entity_id": "ticket123",
            "external_system_id": "servicenow_incident",
        });
        builder
            .store()
            .put(
                "tracked_entities",
                "servicenow_incident.entity123",
                serde_json::to_vec(&record).unwrap(),
            )
            .await
            .unwrap();

        let response = post_json(
            app,
            "/check_if_ext_entity_exists",
            json!({"internal_entity_id": "entity123", "external_system_id": "servicenow_incident"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "exists": true,
                "ext_id": "ticket123",
                "ext_system_id": "servicenow_incident",
            })
        );
    }

    #[tokio::test]
    async fn test_check_scopes_by_system_id() {
        let (builder, app) = test_app();

        let record = json!({
            "internal_entity_id": "entity123",
            "external_entity_id": "ticket123",
            "external_system_id": "servicenow_sir_incident",
        });
        builder
            .store()
            .put(
                "tracked_entities",
                "servicenow_incident.entity123",
                serde_json::to_vec(&record).unwrap(),
            )
            .await
            .unwrap();

        let response = post_json(
            app,
            "/check_if_ext_entity_exists",
            json!({"internal_entity_id": "entity123", "external_system_id": "servicenow_incident"}),
        )
        .await;

        assert_eq!(body_json(response).await, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_check_surfaces_client_init_failure() {
        let (builder, app) = test_app();
        builder.fail_next_build("credentials rejected");

        let response = post_json(
            app,
            "/check_if_ext_entity_exists",
            json!({"internal_entity_id": "e", "external_system_id": ""}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = error_message(response).await;
        assert!(message.starts_with("error creating Falcon client:"));
        assert!(message.contains("credentials rejected"));
    }

    #[tokio::test]
    async fn test_check_surfaces_storage_outage() {
        let (builder, app) = test_app();
        builder.store().fail_next_get("kv outage").await;

        let response = post_json(
            app,
            "/check_if_ext_entity_exists",
            json!({"internal_entity_id": "e", "external_system_id": "servicenow_incident"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = error_message(response).await;
        assert!(message.starts_with("failed to check if ticket exists:"));
        assert!(message.contains("kv outage"));
    }

    #[tokio::test]
    async fn test_create_mapping_persists_and_echoes() {
        let (builder, app) = test_app();

        let body = json!({
            "internal_entity_id": "entity123",
            "external_entity_id": "ticket123",
            "external_system_id": "servicenow_incident",
        });
        let response = post_json(app, "/create_entity_mapping", body.clone()).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, body);

        let stored = builder
            .store()
            .get("tracked_entities", "servicenow_incident.entity123")
            .await
            .unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(stored, body);
    }

    #[tokio::test]
    async fn test_create_mapping_overwrites_previous() {
        let (_builder, app) = test_app();

        let first = json!({
            "internal_entity_id": "entity123",
            "external_entity_id": "ticket123",
            "external_system_id": "servicenow_incident",
        });
        post_json(app.clone(), "/create_entity_mapping", first).await;

        let second = json!({
            "internal_entity_id": "entity123",
            "external_entity_id": "ticket456",
            "external_system_id": "servicenow_incident",
        });
        post_json(app.clone(), "/create_entity_mapping", second).await;

        let response = post_json(
            app,
            "/check_if_ext_entity_exists",
            json!({"internal_entity_id": "entity123", "external_system_id": "servicenow_incident"}),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["ext_id"], "ticket456");
    }

    #[tokio::test]
    async fn test_create_mapping_surfaces_put_failure() {
        let (builder, app) = test_app();
        builder.store().fail_next_put("kv outage").await;

        let response = post_json(
            app,
            "/create_entity_mapping",
            json!({
                "internal_entity_id": "entity123",
                "external_entity_id": "ticket123",
                "external_system_id": "servicenow_incident",
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = error_message(response).await;
        assert!(message.contains("error storing entity mapping in collection"));
    }
}
