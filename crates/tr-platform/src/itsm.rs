//! ServiceNow payload shaping and result extraction.
//!
//! The incident-creation handlers bind one of two operation/class triples
//! and otherwise share this code: build the request payload from the
//! caller's fields, then pull the ticket identity (or the application
//! error) out of the integration's response body.

use serde_json::{Map, Value};
use tracing::debug;

/// Operation id for the standard incident class.
pub const OPERATION_CREATE_INCIDENT: &str = "create_incident";
/// Operation id for the security-incident class.
pub const OPERATION_CREATE_SIR_INCIDENT: &str = "create_sn_si_incident";

/// Ticket type reported for the standard incident class.
pub const TICKET_TYPE_INCIDENT: &str = "incident";
/// Ticket type reported for the security-incident class.
pub const TICKET_TYPE_SIR_INCIDENT: &str = "sn_si_incident";

/// External-system sentinel for standard incidents in the mapping store.
pub const EXTERNAL_SYSTEM_ID_SERVICENOW_INCIDENT: &str = "servicenow_incident";
/// External-system sentinel for security incidents in the mapping store.
pub const EXTERNAL_SYSTEM_ID_SERVICENOW_SIR_INCIDENT: &str = "servicenow_sir_incident";

/// Ticket fields accepted from the caller.
///
/// `short_description` is required by ServiceNow; the rest are forwarded
/// only when non-empty. `custom_fields` is a JSON-encoded object passed
/// through opaquely.
#[derive(Debug, Clone, Default)]
pub struct IncidentFields {
    pub short_description: String,
    pub assignment_group: String,
    pub category: String,
    pub description: String,
    pub impact: String,
    pub severity: String,
    pub state: String,
    pub urgency: String,
    pub work_notes: String,
    pub custom_fields: String,
}

/// Builds the outbound ticket payload.
///
/// Custom fields merge over the named fields, overwriting collisions.
/// Malformed `custom_fields` JSON is dropped rather than failing the
/// ticket create.
pub fn build_incident_payload(fields: &IncidentFields) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert(
        "short_description".to_string(),
        Value::String(fields.short_description.clone()),
    );

    let optional = [
        ("assignment_group", &fields.assignment_group),
        ("category", &fields.category),
        ("description", &fields.description),
        ("impact", &fields.impact),
        ("severity", &fields.severity),
        ("state", &fields.state),
        ("urgency", &fields.urgency),
        ("work_notes", &fields.work_notes),
    ];

    for (name, value) in optional {
        if !value.is_empty() {
            payload.insert(name.to_string(), Value::String(value.clone()));
        }
    }

    if !fields.custom_fields.is_empty() {
        match serde_json::from_str::<Map<String, Value>>(&fields.custom_fields) {
            Ok(custom) => {
                for (key, value) in custom {
                    payload.insert(key, value);
                }
            }
            Err(err) => {
                debug!(error = %err, "ignoring malformed custom_fields payload");
            }
        }
    }

    payload
}

/// What the integration reported for a ticket-creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOutcome {
    /// The ticket identity from `result`. Fields default to empty when the
    /// response carried no usable `result` document.
    Created {
        sys_id: String,
        sys_class_name: String,
    },
    /// The response carried an `error` field, rendered to text.
    Failed(String),
}

/// Extracts the ticket outcome from a resource's response body.
///
/// An `error` field of any JSON shape takes precedence over `result`:
/// strings are used verbatim, anything else is serialized to canonical
/// JSON (object keys sorted).
pub fn extract_ticket_outcome(body: Option<&Value>) -> TicketOutcome {
    let map = body.and_then(Value::as_object);

    if let Some(error) = map.and_then(|m| m.get("error")) {
        let text = match error {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_else(|_| {
                format!("Error field present but could not be parsed: {}", other)
            }),
        };
        return TicketOutcome::Failed(text);
    }

    let result = map.and_then(|m| m.get("result")).and_then(Value::as_object);

    let field = |name: &str| -> String {
        result
            .and_then(|r| r.get(name))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    TicketOutcome::Created {
        sys_id: field("sys_id"),
        sys_class_name: field("sys_class_name"),
    }
}
