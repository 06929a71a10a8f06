//! OpenQuote Core (OQC)
//!
//! The quote bounded context: issuing, revising, and verifying commercial
//! quote documents for a B2B sales process.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Quote aggregate with its revision chain and status
//!   machine, value objects, domain events, the totals service
//! - **Application Layer**: Command and query services, DTOs
//! - **Ports Layer**: Hexagonal architecture interfaces
//! - **Infrastructure Layer**: In-memory implementations
//!
//! ## Key rules
//!
//! - A lineage shares one folio and one client; versions are `1, 2, 3, …`
//!   with no gaps or duplicates
//! - History is immutable: edits materialize as new revisions
//! - Totals are always recomputed server-side from items before any write
//! - Folio lookups resolve to the latest lineage member; id lookups pin
//!   the exact row

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{QuoteService, VerificationService};
pub use application::dto::{ClientSummary, CreateQuoteCommand, QuoteItemDraft, QuoteSnapshot, QuoteView};
pub use domain::aggregates::{ItemDetail, Quote, QuoteDomainError, QuoteItem, QuoteStatus};
pub use domain::events::QuoteEvent;
pub use domain::value_objects::{Currency, EntityId, Folio, Money};
pub use ports::inbound::{QuoteUseCases, VerificationUseCases};
pub use ports::outbound::{
    ClientRecord, ClientRegistry, DocumentRenderer, EventPublisher, FolioSequencer,
    RegistryError, RenderError, RenderedDocument, RepositoryError, QuoteRepository,
    SequencerError,
};
