use std::sync::Arc;

use axum::{
    extract::Extension,
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
    Router,
};

use rolodex_contacts::NewContact;
use rolodex_core::RepositoryError;

use crate::app::dto::{
    self, DeletedContact, PatchContactRequest, UpdateContactRequest,
};
use crate::app::errors::ApiError;
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::context::{ContactIdPath, Identity, ListParams};
use crate::middleware::{auth_middleware, AuthState};

pub const EMAIL_IN_USE: &str = "email is already in use";
pub const CONTACT_NOT_FOUND: &str = "contact not found";

/// Reads are public; writes go through the API-key check.
pub fn router(auth: AuthState) -> Router {
    let auth = from_fn_with_state(auth, auth_middleware);

    Router::new()
        .route(
            "/",
            get(list_contacts)
                .post(create_contact.layer(auth.clone()))
                .put(update_contact.layer(auth.clone()))
                .patch(patch_contact.layer(auth.clone())),
        )
        .route("/:id", get(get_contact).delete(delete_contact.layer(auth)))
}

fn store_error(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::Conflict(_) => ApiError::conflict(EMAIL_IN_USE),
        other => other.into(),
    }
}

async fn list_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    ListParams(query): ListParams,
) -> Result<Response, ApiError> {
    let page = services.contacts.list(&query).await?;
    Ok(dto::success(StatusCode::OK, page))
}

async fn get_contact(
    Extension(services): Extension<Arc<AppServices>>,
    ContactIdPath(id): ContactIdPath,
) -> Result<Response, ApiError> {
    let contact = services
        .contacts
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(CONTACT_NOT_FOUND))?;
    Ok(dto::success(StatusCode::OK, contact))
}

async fn create_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(new): ValidatedJson<NewContact>,
) -> Result<Response, ApiError> {
    let contact = services.contacts.create(new).await.map_err(store_error)?;
    tracing::info!(contact_id = %contact.id, privileged = identity.is_privileged(), "contact created");
    Ok(dto::success(StatusCode::CREATED, contact))
}

async fn update_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(req): ValidatedJson<UpdateContactRequest>,
) -> Result<Response, ApiError> {
    let (id, changes) = req.into_parts()?;
    let contact = services
        .contacts
        .update(id, changes)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::not_found(CONTACT_NOT_FOUND))?;
    tracing::info!(contact_id = %contact.id, privileged = identity.is_privileged(), "contact replaced");
    Ok(dto::success(StatusCode::OK, contact))
}

async fn patch_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(req): ValidatedJson<PatchContactRequest>,
) -> Result<Response, ApiError> {
    let (id, changes) = req.into_parts()?;
    let contact = services
        .contacts
        .update(id, changes)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::not_found(CONTACT_NOT_FOUND))?;
    tracing::info!(contact_id = %contact.id, privileged = identity.is_privileged(), "contact updated");
    Ok(dto::success(StatusCode::OK, contact))
}

async fn delete_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ContactIdPath(id): ContactIdPath,
) -> Result<Response, ApiError> {
    let contact = services
        .contacts
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::not_found(CONTACT_NOT_FOUND))?;
    tracing::info!(contact_id = %contact.id, privileged = identity.is_privileged(), "contact deleted");
    Ok(dto::success(
        StatusCode::OK,
        DeletedContact {
            message: "contact deleted",
            deleted_contact: contact,
        },
    ))
}
