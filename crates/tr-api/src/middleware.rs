//! HTTP middleware: request context, logging, and panic recovery.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// Trace identifier header name.
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Trace identifier extension carried through the request.
#[derive(Clone, Debug, Default)]
pub struct TraceId(pub String);

/// Access credential forwarded by the caller, when present.
#[derive(Clone, Debug, Default)]
pub struct AccessToken(pub Option<String>);

/// Attaches the trace id and access credential to the request, echoing the
/// trace id on the response.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let access_token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);

    request.extensions_mut().insert(TraceId(trace_id.clone()));
    request.extensions_mut().insert(AccessToken(access_token));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}

/// Logs every request with its outcome and timing.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let trace_id = request
        .extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_default();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(
            trace_id = %trace_id,
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms,
            "request failed"
        );
    } else {
        info!(
            trace_id = %trace_id,
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms,
            "request completed"
        );
    }

    response
}

/// Recovery boundary for workflow-invoked handlers.
///
/// A panic anywhere below becomes a structured 500 carrying the trace
/// identifier, so the workflow engine sees a normal error response instead
/// of a dropped connection.
pub async fn recover_workflow_panics(request: Request, next: Next) -> Response {
    let trace_id = request
        .extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_default();
    let url = request.uri().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let value = panic_value(panic.as_ref());

            error!(
                trace_id = %trace_id,
                url = %url,
                value = %value,
                backtrace = %std::backtrace::Backtrace::force_capture(),
                "handler panic recovered"
            );

            ApiError::HandlerPanic { value, trace_id }.into_response()
        }
    }
}

fn panic_value(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
