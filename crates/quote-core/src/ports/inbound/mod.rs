//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces. All use cases
//! resolve to the platform error taxonomy so a caller sees exactly one
//! error class per failure.

use async_trait::async_trait;

use quote_common::QuoteResult;

use crate::application::dto::CreateQuoteCommand;
use crate::domain::aggregates::{Quote, QuoteStatus};
use crate::domain::value_objects::EntityId;
use crate::ports::outbound::RenderedDocument;

/// Quote management use cases
#[async_trait]
pub trait QuoteUseCases: Send + Sync {
    /// Create the first member of a new lineage
    async fn create_quote(&self, command: CreateQuoteCommand) -> QuoteResult<Quote>;

    /// Derive a new revision from an existing quote
    async fn create_revision(&self, parent_id: &EntityId) -> QuoteResult<Quote>;

    /// Attempt a status transition
    async fn transition(&self, id: &EntityId, to: QuoteStatus) -> QuoteResult<Quote>;
}

/// Verification use cases (external read path)
#[async_trait]
pub trait VerificationUseCases: Send + Sync {
    /// Latest member of the lineage named by the folio
    async fn resolve_by_folio(&self, folio: &str) -> QuoteResult<Quote>;

    /// The exact row, even when a newer revision exists
    async fn resolve_by_id(&self, id: &EntityId) -> QuoteResult<Quote>;

    /// Produce the printable artifact for one quote
    async fn render_document(
        &self,
        id: &EntityId,
        verification_url: &str,
    ) -> QuoteResult<RenderedDocument>;
}
