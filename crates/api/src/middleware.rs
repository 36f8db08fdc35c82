use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use rolodex_auth::{ApiKeyAllowList, AuthError};
use rolodex_infra::RuntimeMode;

use crate::app::errors::{ApiError, Fault};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AuthState {
    pub keys: Arc<ApiKeyAllowList>,
}

impl AuthState {
    pub fn new(keys: ApiKeyAllowList) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }
}

/// Rejects requests without an allow-listed `x-api-key` header and attaches
/// the caller's [`Identity`](crate::context::Identity) for downstream stages.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = extract_api_key(req.headers())?;
    let identity = state.keys.authenticate(key)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn extract_api_key(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(API_KEY_HEADER) {
        None => Ok(None),
        // Non-ASCII bytes can never match an allow-listed key.
        Some(value) => value.to_str().map(Some).map_err(|_| AuthError::InvalidKey),
    }
}

/// One access-log line per request.
pub async fn request_logger(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    response
}

/// Terminal error stage.
///
/// Logs every fault raised below it and, outside production, re-renders the
/// envelope with the diagnostic trace. A method that exists on no route for
/// the path is reported like an unknown route; any other error status without
/// a fault is wrapped in the envelope so no plain-text error leaves the app.
pub async fn error_handler(State(mode): State<RuntimeMode>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    let (response, fault) = match response.extensions().get::<Fault>().cloned() {
        Some(fault) => (response, fault),
        None if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            let response = ApiError::not_found("route not found").into_response();
            match response.extensions().get::<Fault>().cloned() {
                Some(fault) => (response, fault),
                None => return response,
            }
        }
        None if response.status().is_client_error() || response.status().is_server_error() => {
            let fault = Fault::unhandled(response.status());
            (fault.render(false), fault)
        }
        None => return response,
    };

    if fault.status.is_server_error() {
        tracing::error!(%method, %path, status = fault.status.as_u16(), trace = ?fault.trace, "{}", fault.message);
    } else {
        tracing::warn!(%method, %path, status = fault.status.as_u16(), "{}", fault.message);
    }

    if mode.is_production() {
        response
    } else {
        fault.render(true)
    }
}
