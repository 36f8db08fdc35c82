use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use rolodex_contacts::{Contact, ContactChanges, NewContact};
use rolodex_core::{ContactId, Schema};
use rolodex_invoicing::NewInvoice;

use crate::app::errors::ApiError;
use crate::app::extract::Validated;

// -------------------------
// Envelopes
// -------------------------

#[derive(Debug, Serialize)]
struct SuccessEnvelope<T> {
    status: &'static str,
    data: T,
}

/// `{"status":"success","data":...}` with the given status code.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(SuccessEnvelope {
            status: "success",
            data,
        }),
    )
        .into_response()
}

// -------------------------
// Request DTOs
// -------------------------

impl Validated for NewContact {
    fn schema() -> &'static Schema {
        rolodex_contacts::schema::create()
    }
}

/// Full replacement. Every field must be present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
}

impl Validated for UpdateContactRequest {
    fn schema() -> &'static Schema {
        rolodex_contacts::schema::full_update()
    }
}

impl UpdateContactRequest {
    pub fn into_parts(self) -> Result<(ContactId, ContactChanges), ApiError> {
        let id = parse_contact_id(&self.id)?;
        let changes = NewContact {
            name: self.name,
            email: self.email,
            mobile_number: self.mobile_number,
        }
        .into();
        Ok((id, changes))
    }
}

/// Partial update. Only `id` is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchContactRequest {
    pub id: String,
    #[serde(flatten)]
    pub changes: ContactChanges,
}

impl Validated for PatchContactRequest {
    fn schema() -> &'static Schema {
        rolodex_contacts::schema::partial_update()
    }
}

impl PatchContactRequest {
    pub fn into_parts(self) -> Result<(ContactId, ContactChanges), ApiError> {
        Ok((parse_contact_id(&self.id)?, self.changes))
    }
}

impl Validated for NewInvoice {
    fn schema() -> &'static Schema {
        rolodex_invoicing::create_schema()
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedContact {
    pub message: &'static str,
    pub deleted_contact: Contact,
}

pub fn parse_contact_id(raw: &str) -> Result<ContactId, ApiError> {
    raw.parse::<ContactId>().map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn patch_request_collects_only_supplied_fields() {
        let id = ContactId::new();
        let req: PatchContactRequest =
            serde_json::from_value(json!({ "id": id.to_string(), "name": "Jane" })).unwrap();
        let (parsed, changes) = req.into_parts().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(changes.name.as_deref(), Some("Jane"));
        assert_eq!(changes.email, None);
    }

    #[test]
    fn malformed_id_is_rejected() {
        let req = UpdateContactRequest {
            id: "not-an-id".into(),
            name: "Jane".into(),
            email: "jane@example.com".into(),
            mobile_number: "0811111111".into(),
        };
        assert!(matches!(req.into_parts(), Err(ApiError::Validation(_))));
    }
}
