//! In-memory implementations of the persistence ports.
//!
//! The quote store enforces the two atomicity guarantees the lineage
//! rules depend on: a unique `(folio, version)` constraint on insert and
//! compare-and-swap semantics on status updates. Both run under one write
//! lock, so a racing writer observes either the state before or after a
//! competitor, never in between.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::aggregates::{Quote, QuoteStatus};
use crate::domain::events::QuoteEvent;
use crate::domain::value_objects::{EntityId, Folio};
use crate::ports::outbound::{
    ClientRecord, ClientRegistry, EventPublisher, QuoteRepository, RegistryError,
    RepositoryError,
};

/// In-memory quote repository
#[derive(Default)]
pub struct InMemoryQuoteRepository {
    rows: RwLock<HashMap<String, Quote>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Quote>, RepositoryError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.get(id.as_str()).cloned())
    }

    async fn find_lineage(&self, folio: &Folio) -> Result<Vec<Quote>, RepositoryError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .values()
            .filter(|q| q.folio() == folio)
            .cloned()
            .collect())
    }

    async fn insert(&self, quote: &Quote) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().unwrap();

        if rows.contains_key(quote.id().as_str()) {
            return Err(RepositoryError::DuplicateKey(quote.id().to_string()));
        }
        if rows
            .values()
            .any(|q| q.folio() == quote.folio() && q.version() == quote.version())
        {
            return Err(RepositoryError::DuplicateKey(format!(
                "{} v{}",
                quote.folio(),
                quote.version()
            )));
        }

        rows.insert(quote.id().to_string(), quote.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        quote: &Quote,
        expected: QuoteStatus,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().unwrap();

        let stored = rows
            .get(quote.id().as_str())
            .ok_or(RepositoryError::NotFound)?;
        if stored.status() != expected {
            return Err(RepositoryError::StaleState(format!(
                "{} is {}, expected {}",
                quote.folio(),
                stored.status(),
                expected
            )));
        }

        rows.insert(quote.id().to_string(), quote.clone());
        Ok(())
    }
}

/// In-memory client registry.
///
/// Stands in for the external directory of active clients. Soft-deleted
/// clients stay stored but are invisible through the port; the
/// availability toggle simulates an outage so callers can exercise their
/// fail-closed paths.
pub struct InMemoryClientRegistry {
    clients: RwLock<HashMap<String, ClientRecord>>,
    available: AtomicBool,
}

impl Default for InMemoryClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn upsert(&self, record: ClientRecord) {
        let mut clients = self.clients.write().unwrap();
        clients.insert(record.id.to_string(), record);
    }

    /// Soft-delete: the record stays, the port stops reporting it.
    pub fn soft_delete(&self, id: &EntityId) {
        let mut clients = self.clients.write().unwrap();
        if let Some(record) = clients.get_mut(id.as_str()) {
            record.active = false;
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistryError::Unavailable("registry offline".into()))
        }
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn find_active(&self, id: &EntityId) -> Result<Option<ClientRecord>, RegistryError> {
        self.check_available()?;
        let clients = self.clients.read().unwrap();
        Ok(clients.get(id.as_str()).filter(|c| c.active).cloned())
    }

    async fn find_active_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<ClientRecord>, RegistryError> {
        self.check_available()?;
        let domain = domain.to_lowercase();
        let clients = self.clients.read().unwrap();
        Ok(clients
            .values()
            .find(|c| c.active && c.domains().contains(&domain.as_str()))
            .cloned())
    }
}

/// Event publisher that emits events to the tracing pipeline.
#[derive(Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, events: Vec<QuoteEvent>) -> Result<(), RepositoryError> {
        for event in events {
            tracing::info!(
                event = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                "domain event"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{ItemDetail, ItemDraft, QuoteDraft};
    use crate::domain::value_objects::Currency;
    use quote_common::Email;
    use rust_decimal_macros::dec;

    fn test_quote(folio: &str) -> Quote {
        Quote::create(
            Folio::new(folio),
            EntityId::new(),
            QuoteDraft {
                items: vec![ItemDraft {
                    part_number: "PN-1".into(),
                    name: "Widget".into(),
                    quantity: 2,
                    unit_price: dec!(50),
                    spec_url: None,
                    detail: ItemDetail::Standard,
                }],
                currency: Currency::CLP,
                notes: None,
                terms: None,
                validity_days: 30,
            },
            true,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_find() {
        let repo = InMemoryQuoteRepository::new();
        let quote = test_quote("Q-1000");

        repo.insert(&quote).await.unwrap();

        let found = repo.find_by_id(quote.id()).await.unwrap().unwrap();
        assert_eq!(found.folio().as_str(), "Q-1000");
        assert_eq!(found.total().amount(), dec!(119));
    }

    #[tokio::test]
    async fn duplicate_version_is_rejected() {
        let repo = InMemoryQuoteRepository::new();
        let parent = test_quote("Q-1000");
        repo.insert(&parent).await.unwrap();

        // two revisions derived from the same parent snapshot race to v2
        let first = parent.revise().unwrap();
        let second = parent.revise().unwrap();

        repo.insert(&first).await.unwrap();
        let err = repo.insert(&second).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateKey(_)));

        let lineage = repo.find_lineage(parent.folio()).await.unwrap();
        assert_eq!(lineage.len(), 2);
    }

    #[tokio::test]
    async fn status_swap_detects_stale_precondition() {
        let repo = InMemoryQuoteRepository::new();
        let quote = test_quote("Q-1000");
        repo.insert(&quote).await.unwrap();

        let mut winner = quote.clone();
        winner.accept().unwrap();
        repo.update_if_status(&winner, QuoteStatus::Open)
            .await
            .unwrap();

        let mut loser = quote.clone();
        loser.reject().unwrap();
        let err = repo
            .update_if_status(&loser, QuoteStatus::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::StaleState(_)));

        let stored = repo.find_by_id(quote.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), QuoteStatus::Accepted);
    }

    #[tokio::test]
    async fn registry_hides_soft_deleted_clients() {
        let registry = InMemoryClientRegistry::new();
        let id = EntityId::new();
        registry.upsert(ClientRecord {
            id: id.clone(),
            legal_name: "ClientCo SpA".into(),
            tax_id: "76.123.456-7".into(),
            contact_emails: vec![Email::parse("buyer@clientco.com").unwrap()],
            active: true,
        });

        assert!(registry
            .find_active_by_domain("clientco.com")
            .await
            .unwrap()
            .is_some());

        registry.soft_delete(&id);

        assert!(registry.find_active(&id).await.unwrap().is_none());
        assert!(registry
            .find_active_by_domain("clientco.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn registry_outage_is_an_error_not_a_miss() {
        let registry = InMemoryClientRegistry::new();
        registry.set_available(false);

        let err = registry.find_active_by_domain("clientco.com").await;
        assert!(matches!(err, Err(RegistryError::Unavailable(_))));
    }
}
