//! Endpoint wiring.

pub mod entities;
pub mod health;
pub mod incidents;
pub mod throttle;

use axum::routing::post;
use axum::{middleware, Router};

use crate::middleware::{recover_workflow_panics, request_context, request_logging};
use crate::state::AppState;

/// Builds the service router.
///
/// The two incident endpoints are invoked from workflow context and carry
/// their own recovery boundary; the rest rely on the server-level panic
/// net.
pub fn create_router(state: AppState) -> Router {
    let workflow = Router::new()
        .route("/create_incident", post(incidents::create_incident))
        .route("/create_sir_incident", post(incidents::create_sir_incident))
        .route_layer(middleware::from_fn(recover_workflow_panics));

    Router::new()
        .merge(health::routes())
        .route(
            "/check_if_ext_entity_exists",
            post(entities::check_external_entity),
        )
        .route(
            "/create_entity_mapping",
            post(entities::create_entity_mapping),
        )
        .route("/throttle", post(throttle::throttle))
        .merge(workflow)
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}
