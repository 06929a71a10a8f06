//! Outbound ports
//!
//! Hexagonal architecture: the interfaces infrastructure must implement.
//! The client registry and the document renderer are external
//! collaborators; only their contracts live here.

use async_trait::async_trait;

use quote_common::Email;

use crate::application::dto::QuoteSnapshot;
use crate::domain::aggregates::{Quote, QuoteStatus};
use crate::domain::events::QuoteEvent;
use crate::domain::value_objects::{EntityId, Folio};

/// Quote repository port.
///
/// The repository is the one place where lineage-level atomicity is
/// enforced: `insert` rejects a duplicate `(folio, version)` pair and
/// `update_if_status` is a compare-and-swap on the stored status.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Find a quote by its opaque id
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Quote>, RepositoryError>;

    /// All members of a lineage, in no particular order
    async fn find_lineage(&self, folio: &Folio) -> Result<Vec<Quote>, RepositoryError>;

    /// Persist a new lineage member.
    ///
    /// Fails with `DuplicateKey` when the `(folio, version)` pair or the
    /// id already exists; the check and the write happen atomically.
    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError>;

    /// Replace a stored quote only while its status still equals
    /// `expected`. Fails with `StaleState` when a concurrent transition
    /// won the race.
    async fn update_if_status(
        &self,
        quote: &Quote,
        expected: QuoteStatus,
    ) -> Result<(), RepositoryError>;
}

/// Repository error type
#[derive(Debug, Clone)]
pub enum RepositoryError {
    NotFound,
    DuplicateKey(String),
    StaleState(String),
    Unavailable(String),
}

impl std::error::Error for RepositoryError {}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "entity not found"),
            Self::DuplicateKey(k) => write!(f, "duplicate key: {}", k),
            Self::StaleState(s) => write!(f, "stale state: {}", s),
            Self::Unavailable(e) => write!(f, "store unavailable: {}", e),
        }
    }
}

/// A client as the external registry reports it.
#[derive(Clone, Debug)]
pub struct ClientRecord {
    pub id: EntityId,
    pub legal_name: String,
    pub tax_id: String,
    pub contact_emails: Vec<Email>,
    pub active: bool,
}

impl ClientRecord {
    /// Domains derived from the registered contact addresses.
    pub fn domains(&self) -> Vec<&str> {
        self.contact_emails.iter().map(|e| e.domain()).collect()
    }
}

/// Client registry port (external collaborator, read-only).
///
/// Both lookups return only active clients; a soft-deleted client is
/// indistinguishable from an absent one.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    async fn find_active(&self, id: &EntityId) -> Result<Option<ClientRecord>, RegistryError>;

    async fn find_active_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<ClientRecord>, RegistryError>;
}

/// Registry failure. An outage must be treated as fail-closed by callers,
/// surfaced as retryable.
#[derive(Debug, Clone)]
pub enum RegistryError {
    Unavailable(String),
}

impl std::error::Error for RegistryError {}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "registry unavailable: {}", e),
        }
    }
}

/// Folio sequencer port.
///
/// Allocation is exactly-once: callers never fabricate a folio locally,
/// and an unreachable backend surfaces as a retryable failure.
#[async_trait]
pub trait FolioSequencer: Send + Sync {
    async fn next_folio(&self) -> Result<Folio, SequencerError>;
}

/// Sequencer failure
#[derive(Debug, Clone)]
pub enum SequencerError {
    Unavailable(String),
}

impl std::error::Error for SequencerError {}

impl std::fmt::Display for SequencerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "sequencer unavailable: {}", e),
        }
    }
}

/// A produced artifact with its embedded verification code.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub verification_code: String,
}

/// Document renderer port (external collaborator).
///
/// Must be deterministic: the same snapshot and verification URL always
/// yield an equivalent artifact, so a document can be re-generated for
/// audit without drift.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(
        &self,
        snapshot: &QuoteSnapshot,
        verification_url: &str,
    ) -> Result<RenderedDocument, RenderError>;
}

/// Renderer failure
#[derive(Debug, Clone)]
pub enum RenderError {
    Unavailable(String),
}

impl std::error::Error for RenderError {}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "renderer unavailable: {}", e),
        }
    }
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish domain events
    async fn publish(&self, events: Vec<QuoteEvent>) -> Result<(), RepositoryError>;
}
