//! Error taxonomy and the Error Envelope.
//!
//! Every stage returns [`ApiError`] on failure. Its `IntoResponse` renders a
//! trace-free envelope and attaches a [`Fault`] to the response extensions;
//! [`crate::middleware::error_handler`] picks the fault up, logs it, and
//! re-renders with the diagnostic trace outside production.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use rolodex_auth::AuthError;
use rolodex_core::{DomainError, FieldViolation, RepositoryError, ValidationErrors};

pub const DEFAULT_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Box::new(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn fault(&self) -> Fault {
        let (message, errors) = match self {
            ApiError::Validation(v) => ("validation failed".to_string(), v.violations().to_vec()),
            other => (other.to_string(), Vec::new()),
        };

        let mut trace = vec![format!("{self:?}")];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            trace.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        Fault {
            status: self.status(),
            message,
            errors,
            trace,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(constraint) => {
                ApiError::Conflict(format!("duplicate value violates {constraint}"))
            }
            other => ApiError::internal(other),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidId(_) => invalid_id(),
        }
    }
}

/// Malformed path or body identifier.
pub fn invalid_id() -> ApiError {
    ApiError::Validation(ValidationErrors::single("id", "id is not a valid identifier"))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let fault = self.fault();
        let mut response = fault.render(false);
        response.extensions_mut().insert(fault);
        response
    }
}

/// Normalized fault handed to the terminal error handler.
#[derive(Debug, Clone)]
pub struct Fault {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<FieldViolation>,
    pub trace: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    status: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    errors: &'a [FieldViolation],
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl Fault {
    /// Fault for an error status produced without an [`ApiError`], such as an
    /// extractor rejection or a layer's own response.
    pub fn unhandled(status: StatusCode) -> Self {
        let message = match status.canonical_reason() {
            Some(reason) if !status.is_server_error() => reason.to_ascii_lowercase(),
            _ => DEFAULT_MESSAGE.to_string(),
        };
        Self {
            status,
            message,
            errors: Vec::new(),
            trace: vec![format!("unhandled {status} response")],
        }
    }

    pub fn render(&self, include_trace: bool) -> Response {
        let message = if self.message.is_empty() {
            DEFAULT_MESSAGE
        } else {
            self.message.as_str()
        };

        let body = ErrorEnvelope {
            status: "error",
            message,
            errors: &self.errors,
            stack: include_trace.then(|| self.trace.join("\n")),
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::from(ValidationErrors::single("email", "bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(AuthError::MissingKey).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(RepositoryError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_conflict_becomes_conflict() {
        let err = ApiError::from(RepositoryError::Conflict("contacts_email_key".into()));
        assert!(matches!(err, ApiError::Conflict(msg) if msg.contains("contacts_email_key")));
    }

    #[test]
    fn malformed_id_is_validation_error_on_id() {
        let err = ApiError::from(DomainError::invalid_id("ContactId: bad"));
        match err {
            ApiError::Validation(v) => assert!(v.has_field("id")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn internal_fault_hides_cause_in_message_but_keeps_it_in_trace() {
        let fault = ApiError::from(RepositoryError::Unavailable("db down".into())).fault();
        assert_eq!(fault.message, DEFAULT_MESSAGE);
        assert!(fault.trace.iter().any(|line| line.contains("db down")));
    }

    #[test]
    fn unhandled_fault_keeps_status_and_hides_server_reasons() {
        let fault = Fault::unhandled(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(fault.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(fault.message, "payload too large");

        let fault = Fault::unhandled(StatusCode::BAD_GATEWAY);
        assert_eq!(fault.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn into_response_attaches_fault() {
        let response = ApiError::not_found("contact not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let fault = response.extensions().get::<Fault>().unwrap();
        assert_eq!(fault.message, "contact not found");
    }
}
