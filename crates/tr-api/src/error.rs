//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tr_core::store::StoreError;

/// API error type.
///
/// Every failure class surfaces to the caller as HTTP 500 with the error
/// text in the body; the workflow engine decides whether to retry.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Could not obtain a credentialed platform client.
    #[error("error creating Falcon client: {0}")]
    ClientInit(String),

    /// Mapping lookup failed before or during an incident create.
    #[error("failed to check if ticket exists: {0}")]
    TicketLookup(String),

    /// The integration RPC itself failed.
    #[error("failed to execute command: {0}")]
    Dispatch(String),

    /// The integration answered without a usable response document.
    #[error("failed to execute command - {0}")]
    EmptyDispatchReply(&'static str),

    /// The ITSM application reported an error in its response body.
    #[error("failed to execute command: ServiceNow Error: {0}")]
    ServiceNow(String),

    /// Storage operation failure, surfaced with the store's own message.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// A recovered handler panic.
    #[error("Internal fn error: {value} (trace_id: '{trace_id}')")]
    HandlerPanic { value: String, trace_id: String },
}

impl ApiError {
    /// HTTP status for this error. All failure classes map to 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// JSON error response body: a list of `{code, message}` entries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            errors: vec![ErrorDetail {
                code: status.as_u16(),
                message: self.to_string(),
            }],
        };

        (status, Json(body)).into_response()
    }
}
