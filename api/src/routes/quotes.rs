//! Quote issuance and lifecycle endpoints (operator side)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use quote_common::QuoteError;
use quote_core::{EntityId, QuoteStatus, QuoteUseCases};

use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", post(create_quote))
        .route("/:id/revisions", post(create_revision))
        .route("/:id/status", post(change_status))
}

/// Create a new quote lineage
#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    request_body = CreateQuoteRequest,
    responses(
        (status = 200, description = "Quote created", body = QuoteResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn create_quote(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateQuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let quote = state.quotes.create_quote(request.into()).await?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(&quote))))
}

/// Derive a new revision from an existing quote
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/revisions",
    params(("id" = String, Path, description = "Parent quote id")),
    responses(
        (status = 200, description = "Revision created", body = QuoteResponse),
        (status = 404, description = "Unknown parent", body = ErrorResponse),
        (status = 409, description = "Version conflict", body = ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn create_revision(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let quote = state
        .quotes
        .create_revision(&EntityId::from_string(id))
        .await?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(&quote))))
}

/// Attempt a status transition
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/status",
    params(("id" = String, Path, description = "Quote id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = QuoteResponse),
        (status = 409, description = "Illegal transition", body = ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn change_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let status = QuoteStatus::parse(&request.status).ok_or_else(|| {
        ApiError(QuoteError::Validation(format!(
            "unknown status: {}",
            request.status
        )))
    })?;

    let quote = state
        .quotes
        .transition(&EntityId::from_string(id), status)
        .await?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(&quote))))
}
