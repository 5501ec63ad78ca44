//! Wire types for API requests and responses.
//!
//! Absent request fields decode as empty strings, matching the permissive
//! envelope the workflow engine sends.

use serde::{Deserialize, Serialize};

use tr_platform::itsm::IncidentFields;

/// Request for the external-entity existence check.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckExternalEntityRequest {
    #[serde(default)]
    pub internal_entity_id: String,
    #[serde(default)]
    pub external_system_id: String,
}

/// Existence-check response; ticket identity present only on a hit.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckExternalEntityResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_system_id: Option<String>,
}

impl CheckExternalEntityResponse {
    pub fn found(ext_id: String, ext_system_id: String) -> Self {
        Self {
            exists: true,
            ext_id: Some(ext_id),
            ext_system_id: Some(ext_system_id),
        }
    }

    pub fn missing() -> Self {
        Self {
            exists: false,
            ext_id: None,
            ext_system_id: None,
        }
    }
}

/// Request to insert or overwrite an entity mapping. The response echoes
/// the stored record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntityMappingRequest {
    #[serde(default)]
    pub internal_entity_id: String,
    #[serde(default)]
    pub external_entity_id: String,
    #[serde(default)]
    pub external_system_id: String,
}

/// Request to create a ticket for an internal entity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncidentRequest {
    #[serde(default)]
    pub config_id: String,
    #[serde(default)]
    pub entity_id: String,

    #[serde(default)]
    pub assignment_group: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub work_notes: String,
    /// JSON-encoded object forwarded opaquely to the ticket payload.
    #[serde(default)]
    pub custom_fields: String,
}

impl CreateIncidentRequest {
    /// The ticket fields forwarded to the ITSM payload builder.
    pub fn ticket_fields(&self) -> IncidentFields {
        IncidentFields {
            short_description: self.short_description.clone(),
            assignment_group: self.assignment_group.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            impact: self.impact.clone(),
            severity: self.severity.clone(),
            state: self.state.clone(),
            urgency: self.urgency.clone(),
            work_notes: self.work_notes.clone(),
            custom_fields: self.custom_fields.clone(),
        }
    }
}

/// Incident-creation response for both ticket classes.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIncidentResponse {
    pub exists: bool,
    pub ticket_id: String,
    pub ticket_type: String,
}

/// Request for a bucketed dedup decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleRequest {
    #[serde(default)]
    pub internal_entity_id: String,
    #[serde(default)]
    pub dedup_obj_type: String,
    #[serde(default)]
    pub dedup_obj_id: String,
    #[serde(default)]
    pub time_bucket: String,
}

/// Throttle decision.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThrottleResponse {
    pub allowed: bool,
}

/// Health probe response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
