//! Query handlers
//!
//! The verification read path: folio and id resolution plus artifact
//! rendering. Reads are side-effect free and idempotent.

use std::sync::Arc;

use async_trait::async_trait;

use quote_common::{QuoteError, QuoteResult, RetryPolicy};

use crate::application::dto::QuoteSnapshot;
use crate::domain::aggregates::Quote;
use crate::domain::value_objects::{EntityId, Folio};
use crate::ports::inbound::VerificationUseCases;
use crate::ports::outbound::{
    ClientRegistry, DocumentRenderer, QuoteRepository, RegistryError, RenderError,
    RenderedDocument,
};

use super::commands::map_repository_error;

/// Verification application service
pub struct VerificationService {
    quotes: Arc<dyn QuoteRepository>,
    registry: Arc<dyn ClientRegistry>,
    renderer: Arc<dyn DocumentRenderer>,
    retry: RetryPolicy,
}

impl VerificationService {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        registry: Arc<dyn ClientRegistry>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            quotes,
            registry,
            renderer,
            retry: RetryPolicy::default(),
        }
    }

    /// The display policy for folio lookups: external viewers always see
    /// the freshest commercial terms, never a stale revision.
    fn latest_of_lineage(lineage: Vec<Quote>) -> Option<Quote> {
        lineage.into_iter().max_by_key(Quote::version)
    }
}

#[async_trait]
impl VerificationUseCases for VerificationService {
    async fn resolve_by_folio(&self, folio: &str) -> QuoteResult<Quote> {
        let lineage = self
            .quotes
            .find_lineage(&Folio::new(folio))
            .await
            .map_err(map_repository_error)?;

        // A miss stays indistinguishable from "exists but inaccessible".
        Self::latest_of_lineage(lineage).ok_or(QuoteError::NotFound)
    }

    async fn resolve_by_id(&self, id: &EntityId) -> QuoteResult<Quote> {
        self.quotes
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or(QuoteError::NotFound)
    }

    async fn render_document(
        &self,
        id: &EntityId,
        verification_url: &str,
    ) -> QuoteResult<RenderedDocument> {
        let quote = self.resolve_by_id(id).await?;

        let registry = Arc::clone(&self.registry);
        let client_id = quote.client_id().clone();
        let client = self
            .retry
            .run(|| {
                let registry = Arc::clone(&registry);
                let client_id = client_id.clone();
                async move {
                    registry.find_active(&client_id).await.map_err(|e| match e {
                        RegistryError::Unavailable(msg) => QuoteError::Transient(msg),
                    })
                }
            })
            .await?
            .ok_or(QuoteError::NotFound)?;

        let snapshot = QuoteSnapshot::from_parts(&quote, &client);

        let renderer = Arc::clone(&self.renderer);
        let url = verification_url.to_string();
        self.retry
            .run(|| {
                let renderer = Arc::clone(&renderer);
                let snapshot = snapshot.clone();
                let url = url.clone();
                async move {
                    renderer.render(&snapshot, &url).await.map_err(|e| match e {
                        RenderError::Unavailable(msg) => QuoteError::Transient(msg),
                    })
                }
            })
            .await
    }
}
