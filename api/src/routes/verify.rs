//! Public verification lookups
//!
//! Folio lookups resolve to the latest lineage member; id lookups pin the
//! exact row. A miss is a uniform "not registered" either way.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use quote_core::{EntityId, VerificationUseCases};

use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/folio/:folio", get(verify_by_folio))
        .route("/id/:id", get(verify_by_id))
}

/// Resolve a folio to the latest revision
#[utoipa::path(
    get,
    path = "/api/v1/verify/folio/{folio}",
    params(("folio" = String, Path, description = "Human-facing quote identifier")),
    responses(
        (status = 200, description = "Latest revision of the lineage", body = QuoteResponse),
        (status = 404, description = "Not registered", body = ErrorResponse)
    ),
    tag = "verify"
)]
pub async fn verify_by_folio(
    State(state): State<Arc<ApiState>>,
    Path(folio): Path<String>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let quote = state.verification.resolve_by_folio(&folio).await?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(&quote))))
}

/// Resolve an opaque id to its exact revision
#[utoipa::path(
    get,
    path = "/api/v1/verify/id/{id}",
    params(("id" = String, Path, description = "Opaque quote id")),
    responses(
        (status = 200, description = "The exact revision", body = QuoteResponse),
        (status = 404, description = "Not registered", body = ErrorResponse)
    ),
    tag = "verify"
)]
pub async fn verify_by_id(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let quote = state
        .verification
        .resolve_by_id(&EntityId::from_string(id))
        .await?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(&quote))))
}
