use axum::{extract::Extension, http::StatusCode, response::Response};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::context::Identity;

pub const WELCOME: &str = "Welcome to the contacts and invoices API";

pub async fn welcome() -> &'static str {
    WELCOME
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(identity): Extension<Identity>) -> Response {
    dto::success(StatusCode::OK, identity)
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}
