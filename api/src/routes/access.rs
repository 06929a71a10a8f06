//! Access gateway endpoints
//!
//! Entry point for document viewers: submit an email, receive (or not) a
//! one-time credential, redeem it for a session landing on the originally
//! requested resource.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/request", post(request_access))
        .route("/redeem", post(redeem))
        .route("/logout", post(logout))
}

/// Request access to a document resource
#[utoipa::path(
    post,
    path = "/api/v1/access/request",
    request_body = AccessRequestBody,
    responses(
        (status = 200, description = "Credential issued", body = AccessGrantResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 503, description = "Registry unavailable, retry later", body = ErrorResponse)
    ),
    tag = "access"
)]
pub async fn request_access(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AccessRequestBody>,
) -> Result<Json<ApiResponse<AccessGrantResponse>>, ApiError> {
    let grant = state
        .gateway
        .request_access(&request.email, &request.resource)
        .await?;

    Ok(Json(ApiResponse::success(AccessGrantResponse {
        token: grant.token,
        destination: grant.destination,
        expires_at: grant.expires_at,
    })))
}

/// Redeem a one-time credential
#[utoipa::path(
    post,
    path = "/api/v1/access/redeem",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Session authenticated", body = RedeemResponse),
        (status = 403, description = "Access denied", body = ErrorResponse)
    ),
    tag = "access"
)]
pub async fn redeem(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<ApiResponse<RedeemResponse>>, ApiError> {
    let redemption = state.gateway.redeem(&request.token)?;

    Ok(Json(ApiResponse::success(RedeemResponse {
        session_id: redemption.session_id,
        destination: redemption.destination,
    })))
}

/// End a viewer session
#[utoipa::path(
    post,
    path = "/api/v1/access/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session ended")
    ),
    tag = "access"
)]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LogoutRequest>,
) -> Json<ApiResponse<()>> {
    state.gateway.logout(&request.session_id);
    Json(ApiResponse::success(()))
}
