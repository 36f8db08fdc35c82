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

use rolodex_invoicing::NewInvoice;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::context::{Identity, ListParams};
use crate::middleware::{auth_middleware, AuthState};

pub fn router(auth: AuthState) -> Router {
    Router::new().route(
        "/",
        get(list_invoices).post(create_invoice.layer(from_fn_with_state(auth, auth_middleware))),
    )
}

async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    ListParams(query): ListParams,
) -> Result<Response, ApiError> {
    let page = services.invoices.list(&query).await?;
    Ok(dto::success(StatusCode::OK, page))
}

async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(new): ValidatedJson<NewInvoice>,
) -> Result<Response, ApiError> {
    let invoice = services.invoices.create(new).await?;
    tracing::info!(
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        privileged = identity.is_privileged(),
        "invoice created"
    );
    Ok(dto::success(StatusCode::CREATED, invoice))
}
