use axum::{handler::Handler, middleware::from_fn_with_state, routing::get, Router};

use crate::middleware::{auth_middleware, AuthState};

pub mod contacts;
pub mod invoices;
pub mod system;

/// Full route table (without the outer layers).
pub fn router(auth: AuthState) -> Router {
    Router::new()
        .route("/", get(system::welcome))
        .route("/health", get(system::health))
        .route(
            "/whoami",
            get(system::whoami.layer(from_fn_with_state(auth.clone(), auth_middleware))),
        )
        .nest("/contact", contacts::router(auth.clone()))
        .nest("/invoice", invoices::router(auth))
        .fallback(system::not_found)
}
