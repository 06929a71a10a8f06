//! Command handlers
//!
//! Application services that orchestrate state-changing use cases.

use std::sync::Arc;

use async_trait::async_trait;

use quote_common::{QuoteError, QuoteResult, RetryPolicy};

use crate::application::dto::CreateQuoteCommand;
use crate::domain::aggregates::{
    ItemDraft, Quote, QuoteDomainError, QuoteDraft, QuoteStatus,
};
use crate::domain::events::QuoteEvent;
use crate::domain::value_objects::{Currency, EntityId, Folio};
use crate::ports::inbound::QuoteUseCases;
use crate::ports::outbound::{
    ClientRegistry, EventPublisher, FolioSequencer, QuoteRepository, RegistryError,
    RepositoryError, SequencerError,
};

/// How often a revision insert is retried against refreshed lineage state
/// before the conflict is surfaced.
const MAX_CONFLICT_RETRIES: u32 = 3;

/// Quote application service
pub struct QuoteService {
    quotes: Arc<dyn QuoteRepository>,
    registry: Arc<dyn ClientRegistry>,
    sequencer: Arc<dyn FolioSequencer>,
    publisher: Arc<dyn EventPublisher>,
    retry: RetryPolicy,
}

impl QuoteService {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        registry: Arc<dyn ClientRegistry>,
        sequencer: Arc<dyn FolioSequencer>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            quotes,
            registry,
            sequencer,
            publisher,
            retry: RetryPolicy::default(),
        }
    }

    async fn allocate_folio(&self) -> QuoteResult<Folio> {
        let sequencer = Arc::clone(&self.sequencer);
        self.retry
            .run(|| {
                let sequencer = Arc::clone(&sequencer);
                async move {
                    sequencer.next_folio().await.map_err(|e| match e {
                        SequencerError::Unavailable(msg) => QuoteError::Transient(msg),
                    })
                }
            })
            .await
    }

    async fn require_active_client(&self, client_id: &EntityId) -> QuoteResult<()> {
        let registry = Arc::clone(&self.registry);
        let id = client_id.clone();
        let found = self
            .retry
            .run(|| {
                let registry = Arc::clone(&registry);
                let id = id.clone();
                async move {
                    registry.find_active(&id).await.map_err(|e| match e {
                        RegistryError::Unavailable(msg) => QuoteError::Transient(msg),
                    })
                }
            })
            .await?;

        if found.is_none() {
            return Err(QuoteError::Validation(
                "client is unknown or inactive".into(),
            ));
        }
        Ok(())
    }

    async fn publish(&self, events: Vec<QuoteEvent>) -> QuoteResult<()> {
        self.publisher
            .publish(events)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl QuoteUseCases for QuoteService {
    async fn create_quote(&self, command: CreateQuoteCommand) -> QuoteResult<Quote> {
        let client_id = EntityId::from_string(&command.client_id);
        self.require_active_client(&client_id).await?;

        let folio = self.allocate_folio().await?;

        let draft = QuoteDraft {
            items: command
                .items
                .into_iter()
                .map(|item| ItemDraft {
                    part_number: item.part_number,
                    name: item.name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    spec_url: item.spec_url,
                    detail: item.detail,
                })
                .collect(),
            currency: command
                .currency
                .as_deref()
                .map(Currency::from_code)
                .unwrap_or_default(),
            notes: command.notes,
            terms: command.terms,
            validity_days: command.validity_days.unwrap_or(30),
        };

        let mut quote = Quote::create(folio, client_id, draft, command.submit)
            .map_err(map_domain_error)?;

        // drain before persisting so the stored copy carries no
        // uncommitted events to replay on a later load
        let events = quote.take_events();
        self.quotes
            .insert(&quote)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(folio = %quote.folio(), status = %quote.status(), "quote created");
        self.publish(events).await?;

        Ok(quote)
    }

    async fn create_revision(&self, parent_id: &EntityId) -> QuoteResult<Quote> {
        let parent = self
            .quotes
            .find_by_id(parent_id)
            .await
            .map_err(map_repository_error)?
            .ok_or(QuoteError::NotFound)?;

        // First attempt revises the quote the caller named. A losing race
        // on the (folio, version) constraint retries against the lineage
        // head, which by then carries the winner's terms.
        let mut source = parent;
        let mut attempt = 0u32;

        loop {
            let mut child = source.revise().map_err(map_domain_error)?;
            let events = child.take_events();

            match self.quotes.insert(&child).await {
                Ok(()) => {
                    tracing::info!(
                        folio = %child.folio(),
                        version = child.version(),
                        "revision created"
                    );
                    self.publish(events).await?;
                    return Ok(child);
                }
                Err(RepositoryError::DuplicateKey(key)) if attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                    tracing::debug!(key = %key, attempt, "revision collided, refreshing lineage");
                    let lineage = self
                        .quotes
                        .find_lineage(source.folio())
                        .await
                        .map_err(map_repository_error)?;
                    source = lineage
                        .into_iter()
                        .max_by_key(Quote::version)
                        .ok_or(QuoteError::NotFound)?;
                }
                Err(err) => return Err(map_repository_error(err)),
            }
        }
    }

    async fn transition(&self, id: &EntityId, to: QuoteStatus) -> QuoteResult<Quote> {
        let mut quote = self
            .quotes
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or(QuoteError::NotFound)?;

        let expected = quote.status();
        quote.transition_to(to).map_err(map_domain_error)?;
        let events = quote.take_events();

        // Compare-and-swap: the precondition and the write are one
        // repository operation, so a concurrent transition cannot also
        // succeed.
        self.quotes
            .update_if_status(&quote, expected)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(folio = %quote.folio(), from = %expected, to = %to, "status changed");
        self.publish(events).await?;

        Ok(quote)
    }
}

pub(crate) fn map_domain_error(err: QuoteDomainError) -> QuoteError {
    match err {
        QuoteDomainError::IllegalTransition { from, to } => QuoteError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        },
        other => QuoteError::Validation(other.to_string()),
    }
}

pub(crate) fn map_repository_error(err: RepositoryError) -> QuoteError {
    match err {
        RepositoryError::NotFound => QuoteError::NotFound,
        RepositoryError::DuplicateKey(key) => QuoteError::Conflict(key),
        RepositoryError::StaleState(detail) => QuoteError::Conflict(detail),
        RepositoryError::Unavailable(msg) => QuoteError::Transient(msg),
    }
}
