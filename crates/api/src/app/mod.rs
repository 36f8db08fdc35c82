//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repository wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `extract.rs`: schema-validated JSON bodies
//! - `dto.rs`: request/response DTOs and the success envelope
//! - `errors.rs`: error taxonomy and the error envelope

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Extension, Router,
};
use tower::ServiceBuilder;

use rolodex_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Outer stages run in order: request logger, terminal error handler, then
/// routing. The unmatched-route fallback sits inside the error handler.
pub fn build_app(config: &AppConfig, services: services::AppServices) -> Router {
    let auth_state = middleware::AuthState::new(config.api_keys.clone());

    routes::router(auth_state)
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::request_logger))
                .layer(from_fn_with_state(config.mode, middleware::error_handler)),
        )
}
