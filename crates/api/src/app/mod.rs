//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: account/post services over the datastore ports
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: body parsing and response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = services.auth_state();

    // Mutations require a verified author; reads stay open.
    let blog = routes::blog::protected_router()
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .merge(routes::blog::public_router());

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1/user", routes::user::router())
        .nest("/api/v1/blog", blog)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        )
}
