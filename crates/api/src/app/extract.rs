//! Body extraction with schema validation.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use rolodex_core::{Schema, ValidationErrors};

use crate::app::errors::ApiError;

/// A request payload guarded by a field schema.
pub trait Validated: DeserializeOwned {
    fn schema() -> &'static Schema;
}

/// JSON body that passed `T::schema()` before being deserialized.
///
/// The raw body is validated first so clients get every field violation in
/// one response, not just the first serde error.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validated,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()))?;

        T::schema().validate(&payload)?;

        let value = serde_json::from_value(payload)
            .map_err(|e| ValidationErrors::single("body", e.to_string()))?;

        Ok(Self(value))
    }
}
