//! API-integrations command dispatch.
//!
//! The platform executes a named operation against a named integration
//! configuration with a JSON payload; Ticket Relay only uses this to
//! instantiate ServiceNow tickets, but the dispatch surface is generic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::{PlatformError, PlatformResult};
use crate::http::HttpClient;

/// Integration definition shipped with the app (see the ServiceNow
/// integration schema).
pub const DEFINITION_ID_SERVICENOW: &str = "servicenow-foundry";

const EXECUTE_COMMAND_PATH: &str = "/plugins/entities/execute/v1";

/// A single command to execute against an integration configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteCommandRequest {
    pub definition_id: String,
    pub operation_id: String,
    pub config_id: String,
    pub request: serde_json::Value,
}

/// Response envelope from command execution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteCommandResponse {
    #[serde(default)]
    pub payload: Option<ExecutePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutePayload {
    #[serde(default)]
    pub resources: Vec<CommandResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandResource {
    #[serde(default)]
    pub response_body: Option<serde_json::Value>,
}

impl ExecuteCommandResponse {
    /// A response holding a single resource with the given body. Handy for
    /// scripting mock dispatchers.
    pub fn with_resource_body(body: serde_json::Value) -> Self {
        Self {
            payload: Some(ExecutePayload {
                resources: vec![CommandResource {
                    response_body: Some(body),
                }],
            }),
        }
    }
}

/// Executes named operations against integration configurations.
///
/// `Ok(None)` means the platform answered without a response document; the
/// caller decides how to treat that.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn execute(
        &self,
        request: ExecuteCommandRequest,
    ) -> PlatformResult<Option<ExecuteCommandResponse>>;
}

/// HTTP-backed dispatcher over the API-integrations surface.
pub struct ApiIntegrations {
    http: Arc<HttpClient>,
}

impl ApiIntegrations {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[derive(Serialize)]
struct WireBody {
    resources: Vec<WireCommand>,
}

#[derive(Serialize)]
struct WireCommand {
    definition_id: String,
    operation_id: String,
    config_id: String,
    request: WireRequest,
}

#[derive(Serialize)]
struct WireRequest {
    json: serde_json::Value,
}

#[async_trait]
impl CommandDispatcher for ApiIntegrations {
    async fn execute(
        &self,
        request: ExecuteCommandRequest,
    ) -> PlatformResult<Option<ExecuteCommandResponse>> {
        debug!(
            definition_id = %request.definition_id,
            operation_id = %request.operation_id,
            config_id = %request.config_id,
            "executing integration command"
        );

        let body = WireBody {
            resources: vec![WireCommand {
                definition_id: request.definition_id,
                operation_id: request.operation_id,
                config_id: request.config_id,
                request: WireRequest {
                    json: request.request,
                },
            }],
        };

        let bytes = self.http.post_json(EXECUTE_COMMAND_PATH, &body).await?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let response: ExecuteCommandResponse = serde_json::from_slice(&bytes)
            .map_err(|err| PlatformError::InvalidResponse(err.to_string()))?;

        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_body_shape() {
        let body = WireBody {
            resources: vec![WireCommand {
                definition_id: DEFINITION_ID_SERVICENOW.to_string(),
                operation_id: "create_incident".to_string(),
                config_id: "cfg-1".to_string(),
                request: WireRequest {
                    json: json!({"short_description": "s"}),
                },
            }],
        };

        let encoded = serde_json::to_value(&body).unwrap();
        assert_eq!(
            encoded["resources"][0]["definition_id"],
            "servicenow-foundry"
        );
        assert_eq!(
            encoded["resources"][0]["request"]["json"]["short_description"],
            "s"
        );
    }

    #[test]
    fn test_response_decoding_defaults() {
        let response: ExecuteCommandResponse = serde_json::from_str("{}").unwrap();
        assert!(response.payload.is_none());

        let response: ExecuteCommandResponse =
            serde_json::from_str(r#"{"payload": {"resources": []}}"#).unwrap();
        assert!(response.payload.unwrap().resources.is_empty());
    }

    #[test]
    fn test_response_decoding_resource_body() {
        let raw = r#"{"payload": {"resources": [{"response_body": {"result": {"sys_id": "abc"}}}]}}"#;
        let response: ExecuteCommandResponse = serde_json::from_str(raw).unwrap();

        let payload = response.payload.unwrap();
        let body = payload.resources[0].response_body.as_ref().unwrap();
        assert_eq!(body["result"]["sys_id"], "abc");
    }

    #[test]
    fn test_with_resource_body_helper() {
        let response = ExecuteCommandResponse::with_resource_body(json!({"result": {}}));
        let payload = response.payload.unwrap();
        assert_eq!(payload.resources.len(), 1);
        assert!(payload.resources[0].response_body.is_some());
    }
}
