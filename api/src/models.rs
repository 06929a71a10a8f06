//! API Models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use quote_common::QuoteError;
use quote_core::{CreateQuoteCommand, ItemDetail, Quote, QuoteItemDraft};

/// Standard API response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Handler error: one platform error class mapped to one HTTP status.
#[derive(Debug)]
pub struct ApiError(pub QuoteError);

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            QuoteError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            QuoteError::NotFound => StatusCode::NOT_FOUND,
            QuoteError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            QuoteError::Conflict(_) => StatusCode::CONFLICT,
            QuoteError::AccessDenied => StatusCode::FORBIDDEN,
            QuoteError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // opaque classes keep their fixed message; transients hide the
        // dependency detail behind a retry hint
        let message = match &self.0 {
            QuoteError::Transient(_) => "try again later".to_string(),
            other => other.to_string(),
        };

        (
            status,
            Json(ApiResponse::<()>::error(self.0.code(), &message)),
        )
            .into_response()
    }
}

// ============ Quotes ============

/// Quote creation request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateQuoteRequest {
    pub client_id: String,
    pub currency: Option<String>,
    pub items: Vec<QuoteItemBody>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub validity_days: Option<u32>,
    /// Submit on creation instead of leaving a draft.
    #[serde(default)]
    pub submit: bool,
}

impl From<CreateQuoteRequest> for CreateQuoteCommand {
    fn from(request: CreateQuoteRequest) -> Self {
        Self {
            client_id: request.client_id,
            currency: request.currency,
            items: request.items.into_iter().map(Into::into).collect(),
            notes: request.notes,
            terms: request.terms,
            validity_days: request.validity_days,
            submit: request.submit,
        }
    }
}

/// One quote line on the wire
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteItemBody {
    pub part_number: String,
    pub name: String,
    pub quantity: u32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    /// Computed server-side; ignored on input.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub line_total: Option<Decimal>,
    pub spec_url: Option<String>,
    #[serde(default)]
    pub detail: ItemDetailBody,
}

impl From<QuoteItemBody> for QuoteItemDraft {
    fn from(body: QuoteItemBody) -> Self {
        Self {
            part_number: body.part_number,
            name: body.name,
            quantity: body.quantity,
            unit_price: body.unit_price,
            spec_url: body.spec_url,
            detail: body.detail.into(),
        }
    }
}

/// Category-specific item fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ItemDetailBody {
    #[default]
    Standard,
    Fabrication {
        material: String,
        finish: String,
    },
    Service {
        hours: u32,
    },
}

impl From<ItemDetailBody> for ItemDetail {
    fn from(body: ItemDetailBody) -> Self {
        match body {
            ItemDetailBody::Standard => Self::Standard,
            ItemDetailBody::Fabrication { material, finish } => {
                Self::Fabrication { material, finish }
            }
            ItemDetailBody::Service { hours } => Self::Service { hours },
        }
    }
}

impl From<&ItemDetail> for ItemDetailBody {
    fn from(detail: &ItemDetail) -> Self {
        match detail {
            ItemDetail::Standard => Self::Standard,
            ItemDetail::Fabrication { material, finish } => Self::Fabrication {
                material: material.clone(),
                finish: finish.clone(),
            },
            ItemDetail::Service { hours } => Self::Service { hours: *hours },
        }
    }
}

/// Quote as the API reports it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub id: String,
    pub folio: String,
    pub version: u32,
    pub parent_folio: Option<String>,
    pub client_id: String,
    pub items: Vec<QuoteItemBody>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub validity_days: u32,
}

impl From<&Quote> for QuoteResponse {
    fn from(quote: &Quote) -> Self {
        Self {
            id: quote.id().to_string(),
            folio: quote.folio().to_string(),
            version: quote.version(),
            parent_folio: quote.parent_folio().map(|f| f.to_string()),
            client_id: quote.client_id().to_string(),
            items: quote
                .items()
                .iter()
                .map(|item| QuoteItemBody {
                    part_number: item.part_number.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: Some(item.line_total),
                    spec_url: item.spec_url.clone(),
                    detail: (&item.detail).into(),
                })
                .collect(),
            subtotal: quote.subtotal().amount(),
            tax: quote.tax().amount(),
            total: quote.total().amount(),
            currency: quote.currency().code().to_string(),
            status: quote.status().to_string(),
            created_at: quote.created_at(),
            notes: quote.notes().map(str::to_string),
            terms: quote.terms().map(str::to_string),
            validity_days: quote.validity_days(),
        }
    }
}

/// Status change request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    /// Target status name: `open`, `accepted`, `rejected`, `invoiced`,
    /// `in_production`.
    pub status: String,
}

// ============ Documents ============

/// Rendered document artifact
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub folio: String,
    pub version: u32,
    pub content_type: String,
    pub verification_code: String,
    /// The artifact body (plain text).
    pub artifact: String,
}

// ============ Access Gateway ============

/// Gateway entry request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestBody {
    pub email: String,
    /// Exact resource path the credential should unlock.
    pub resource: String,
}

/// Issued one-time credential
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessGrantResponse {
    pub token: String,
    /// Where redemption will land the caller.
    pub destination: String,
    pub expires_at: DateTime<Utc>,
}

/// Credential redemption request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub token: String,
}

/// Authenticated viewer session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedeemResponse {
    pub session_id: String,
    pub destination: String,
}

/// Logout request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub session_id: String,
}
