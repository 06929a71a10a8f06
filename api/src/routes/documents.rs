//! Gated document retrieval
//!
//! Every request passes through the access gateway first: the
//! `x-viewer-session` header must name a session authenticated for
//! exactly the requested path.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use quote_common::QuoteError;
use quote_core::{EntityId, Quote, VerificationUseCases};

use crate::models::*;
use crate::{ApiState, VIEWER_SESSION_HEADER};

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/folio/:folio", get(document_by_folio))
        .route("/id/:id", get(document_by_id))
}

fn session_id(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(VIEWER_SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError(QuoteError::AccessDenied))
}

async fn render(state: &ApiState, quote: &Quote) -> Result<DocumentResponse, ApiError> {
    // the embedded URL pins the exact revision, so an already-distributed
    // artifact stays verifiable after later revisions
    let verification_url = format!("{}/api/v1/verify/id/{}", state.base_url, quote.id());
    let document = state
        .verification
        .render_document(quote.id(), &verification_url)
        .await?;

    Ok(DocumentResponse {
        folio: quote.folio().to_string(),
        version: quote.version(),
        content_type: document.content_type.to_string(),
        verification_code: document.verification_code,
        artifact: String::from_utf8_lossy(&document.bytes).into_owned(),
    })
}

/// Latest document of a lineage
#[utoipa::path(
    get,
    path = "/api/v1/documents/folio/{folio}",
    params(("folio" = String, Path, description = "Human-facing quote identifier")),
    responses(
        (status = 200, description = "Rendered artifact", body = DocumentResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not registered", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn document_by_folio(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(folio): Path<String>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    let session = session_id(&headers)?;
    state
        .gateway
        .authorize(session, &format!("/api/v1/documents/folio/{folio}"))?;

    let quote = state.verification.resolve_by_folio(&folio).await?;
    let document = render(&state, &quote).await?;
    Ok(Json(ApiResponse::success(document)))
}

/// Exact revision document
#[utoipa::path(
    get,
    path = "/api/v1/documents/id/{id}",
    params(("id" = String, Path, description = "Opaque quote id")),
    responses(
        (status = 200, description = "Rendered artifact", body = DocumentResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Not registered", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn document_by_id(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DocumentResponse>>, ApiError> {
    let session = session_id(&headers)?;
    state
        .gateway
        .authorize(session, &format!("/api/v1/documents/id/{id}"))?;

    let quote = state
        .verification
        .resolve_by_id(&EntityId::from_string(id))
        .await?;
    let document = render(&state, &quote).await?;
    Ok(Json(ApiResponse::success(document)))
}
