//! Per-request context values derived before a handler runs.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;

use rolodex_core::{ContactId, ListQuery};

use crate::app::dto::parse_contact_id;
use crate::app::errors::{invalid_id, ApiError};

pub use rolodex_auth::Identity;

/// Contact id taken from the `:id` path segment.
///
/// Undecodable segments and unparsable ids both become a validation error on
/// `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactIdPath(pub ContactId);

#[async_trait]
impl<S> FromRequestParts<S> for ContactIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_id())?;
        parse_contact_id(&raw).map(Self)
    }
}

/// Normalized listing query (`page`, `limit`, passthrough keys).
///
/// Never rejects: unusable values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListParams(pub ListQuery);

impl ListParams {
    pub fn query(&self) -> &ListQuery {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        Ok(Self(ListQuery::from_pairs(pairs)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(uri: &str) -> ListQuery {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        let ListParams(query) = ListParams::from_request_parts(&mut parts, &()).await.unwrap();
        query
    }

    #[tokio::test]
    async fn missing_query_uses_defaults() {
        let query = extract("/contact").await;
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
    }

    #[tokio::test]
    async fn numeric_strings_are_coerced_and_extra_keys_kept() {
        let query = extract("/contact?page=3&limit=5&search=jo").await;
        assert_eq!(query.page(), 3);
        assert_eq!(query.limit(), 5);
        assert_eq!(query.search(), Some("jo"));
    }

    #[tokio::test]
    async fn garbage_falls_back_to_defaults() {
        let query = extract("/contact?page=abc&limit=-4").await;
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
    }
}
