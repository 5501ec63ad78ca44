//! HTTP API for Ticket Relay.
//!
//! Five POST endpoints sit atop the platform's key-value storage and its
//! integration dispatcher: the external-entity existence check, mapping
//! upsert, the two incident-creation flows, and the throttle decision.
//! Every failure class surfaces as HTTP 500 with a `{code, message}` error
//! list; idempotent hits answer 200 and fresh writes answer 201.

pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod testutils;

pub use error::{ApiError, ErrorResponse};
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
