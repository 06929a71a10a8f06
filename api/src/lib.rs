//! OpenQuote REST API
//!
//! The HTTP surface over the quote bounded context and the access
//! gateway.
//!
//! # Endpoints
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        OPENQUOTE API                            │
//! │                                                                 │
//! │  /api/v1/quotes        create | revise | transition (operator)  │
//! │  /api/v1/verify        folio → latest | id → exact (public)     │
//! │  /api/v1/documents     rendered artifacts (gateway-gated)       │
//! │  /api/v1/access        request | redeem | logout                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Verification lookups are public but uniform on a miss. Document
//! retrieval requires an `x-viewer-session` header naming a session the
//! gateway authenticated for exactly that path.

pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quote_core::infrastructure::{
    CounterFolioSequencer, InMemoryClientRegistry, InMemoryQuoteRepository, PlainTextRenderer,
    TracingEventPublisher,
};
use quote_core::{QuoteService, VerificationService};
use quote_gateway::{AccessGateway, GatewayConfig};

pub use models::*;

/// Header naming the viewer session on gated document requests.
pub const VIEWER_SESSION_HEADER: &str = "x-viewer-session";

/// API state
#[derive(Clone)]
pub struct ApiState {
    pub quotes: Arc<QuoteService>,
    pub verification: Arc<VerificationService>,
    pub gateway: Arc<AccessGateway>,
    /// Handle for seeding; the services consume it through the port.
    pub registry: Arc<InMemoryClientRegistry>,
    /// Absolute base for embedded verification URLs.
    pub base_url: String,
}

impl ApiState {
    /// Wire the full platform against the in-memory infrastructure.
    pub fn in_memory(base_url: impl Into<String>, gateway_config: GatewayConfig) -> Self {
        let repository = Arc::new(InMemoryQuoteRepository::new());
        let registry = Arc::new(InMemoryClientRegistry::new());
        let sequencer = Arc::new(CounterFolioSequencer::new());
        let renderer = Arc::new(PlainTextRenderer::new());

        let quotes = Arc::new(QuoteService::new(
            repository.clone(),
            registry.clone(),
            sequencer,
            Arc::new(TracingEventPublisher),
        ));
        let verification = Arc::new(VerificationService::new(
            repository,
            registry.clone(),
            renderer,
        ));
        let gateway = Arc::new(AccessGateway::new(registry.clone(), gateway_config));

        Self {
            quotes,
            verification,
            gateway,
            registry,
            base_url: base_url.into(),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenQuote API",
        version = "1.0.0",
        description = "OpenQuote - quote issuance, revision, verification, and gated document access",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::quotes::create_quote,
        routes::quotes::create_revision,
        routes::quotes::change_status,
        routes::verify::verify_by_folio,
        routes::verify::verify_by_id,
        routes::documents::document_by_folio,
        routes::documents::document_by_id,
        routes::access::request_access,
        routes::access::redeem,
        routes::access::logout,
    ),
    components(
        schemas(
            ErrorResponse,
            CreateQuoteRequest, QuoteItemBody, ItemDetailBody, QuoteResponse,
            StatusChangeRequest,
            DocumentResponse,
            AccessRequestBody, AccessGrantResponse, RedeemRequest, RedeemResponse,
            LogoutRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quotes", description = "Quote issuance and lifecycle"),
        (name = "verify", description = "Public verification lookups"),
        (name = "documents", description = "Gated document retrieval"),
        (name = "access", description = "Access gateway")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .nest("/quotes", routes::quotes::router())
        .nest("/verify", routes::verify::router())
        .nest("/documents", routes::documents::router())
        .nest("/access", routes::access::router())
}
