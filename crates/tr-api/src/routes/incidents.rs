//! Incident-creation endpoints for the two ticket classes.
//!
//! Both flows share one pipeline and differ only in the bound
//! operation/class triple: check for an existing mapping, build the ticket
//! payload, execute the integration command, extract the ticket identity,
//! persist the mapping, respond.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::Value;
use tracing::{error, info};

use tr_core::models::ExternalEntityRecord;
use tr_core::store::MappingStore;
use tr_platform::integrations::{ExecuteCommandRequest, DEFINITION_ID_SERVICENOW};
use tr_platform::itsm::{
    build_incident_payload, extract_ticket_outcome, TicketOutcome,
    EXTERNAL_SYSTEM_ID_SERVICENOW_INCIDENT, EXTERNAL_SYSTEM_ID_SERVICENOW_SIR_INCIDENT,
    OPERATION_CREATE_INCIDENT, OPERATION_CREATE_SIR_INCIDENT, TICKET_TYPE_INCIDENT,
    TICKET_TYPE_SIR_INCIDENT,
};

use crate::dto::{CreateIncidentRequest, CreateIncidentResponse};
use crate::error::ApiError;
use crate::middleware::{AccessToken, TraceId};
use crate::state::AppState;

/// The operation/class triple distinguishing the two ticket flows.
struct IncidentBinding {
    operation_id: &'static str,
    ticket_type: &'static str,
    external_system_id: &'static str,
}

const INCIDENT: IncidentBinding = IncidentBinding {
    operation_id: OPERATION_CREATE_INCIDENT,
    ticket_type: TICKET_TYPE_INCIDENT,
    external_system_id: EXTERNAL_SYSTEM_ID_SERVICENOW_INCIDENT,
};

const SIR_INCIDENT: IncidentBinding = IncidentBinding {
    operation_id: OPERATION_CREATE_SIR_INCIDENT,
    ticket_type: TICKET_TYPE_SIR_INCIDENT,
    external_system_id: EXTERNAL_SYSTEM_ID_SERVICENOW_SIR_INCIDENT,
};

/// POST /create_incident
pub async fn create_incident(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Extension(token): Extension<AccessToken>,
    Json(request): Json<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<CreateIncidentResponse>), ApiError> {
    create_with_binding(state, trace_id, token, request, INCIDENT).await
}

/// POST /create_sir_incident
pub async fn create_sir_incident(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Extension(token): Extension<AccessToken>,
    Json(request): Json<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<CreateIncidentResponse>), ApiError> {
    create_with_binding(state, trace_id, token, request, SIR_INCIDENT).await
}

async fn create_with_binding(
    state: AppState,
    trace_id: TraceId,
    token: AccessToken,
    request: CreateIncidentRequest,
    binding: IncidentBinding,
) -> Result<(StatusCode, Json<CreateIncidentResponse>), ApiError> {
    info!(
        ticket_type = binding.ticket_type,
        trace_id = %trace_id.0,
        "creating incident"
    );

    let client = state
        .builder
        .build(token.0.as_deref())
        .map_err(|err| ApiError::ClientInit(err.to_string()))?;

    let mappings = MappingStore::new(client.object_store());

    // A ticket of this class may already exist for the entity.
    let existing = mappings
        .lookup(&request.entity_id, binding.external_system_id)
        .await
        .map_err(|err| ApiError::TicketLookup(err.to_string()))?;

    if let Some(record) = existing {
        info!(
            entity_id = %request.entity_id,
            ticket_id = %record.external_entity_id,
            "ticket already exists for entity"
        );
        return Ok((
            StatusCode::OK,
            Json(CreateIncidentResponse {
                exists: true,
                ticket_id: record.external_entity_id,
                ticket_type: binding.ticket_type.to_string(),
            }),
        ));
    }

    let request_payload = build_incident_payload(&request.ticket_fields());
    let command = ExecuteCommandRequest {
        definition_id: DEFINITION_ID_SERVICENOW.to_string(),
        operation_id: binding.operation_id.to_string(),
        config_id: request.config_id.clone(),
        request: Value::Object(request_payload),
    };

    let response = client
        .dispatcher()
        .execute(command)
        .await
        .map_err(|err| ApiError::Dispatch(err.to_string()))?
        .ok_or(ApiError::EmptyDispatchReply("nil response"))?;

    let payload = response
        .payload
        .ok_or(ApiError::EmptyDispatchReply("empty response"))?;

    let resource = payload
        .resources
        .first()
        .ok_or(ApiError::EmptyDispatchReply(
            "empty resources in response payload",
        ))?;

    let (sys_id, sys_class_name) = match extract_ticket_outcome(resource.response_body.as_ref()) {
        TicketOutcome::Failed(text) => return Err(ApiError::ServiceNow(text)),
        TicketOutcome::Created {
            sys_id,
            sys_class_name,
        } => (sys_id, sys_class_name),
    };

    info!(
        ticket_id = %sys_id,
        ticket_type = %sys_class_name,
        "received response from ITSM"
    );

    if !sys_id.is_empty() {
        let record = ExternalEntityRecord {
            internal_entity_id: request.entity_id.clone(),
            external_entity_id: sys_id.clone(),
            external_system_id: binding.external_system_id.to_string(),
        };

        mappings.upsert(&record).await.map_err(|err| {
            error!(error = %err, "failed to store entity mapping");
            ApiError::Storage(err)
        })?;
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateIncidentResponse {
            exists: false,
            ticket_id: sys_id,
            ticket_type: sys_class_name,
        }),
    ))
}
