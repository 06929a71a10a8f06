//! Folio allocation.
//!
//! Folios come from a serializing counter, never from timestamps or any
//! other client-visible source a concurrent caller could race to.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::value_objects::Folio;
use crate::ports::outbound::{FolioSequencer, SequencerError};

/// First folio number a fresh installation issues.
const FIRST_FOLIO: u64 = 1000;

/// Atomic counter sequencer.
///
/// `fetch_add` serializes concurrent allocations, so every caller gets a
/// distinct folio exactly once.
pub struct CounterFolioSequencer {
    next: AtomicU64,
}

impl CounterFolioSequencer {
    pub fn new() -> Self {
        Self::starting_at(FIRST_FOLIO)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for CounterFolioSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FolioSequencer for CounterFolioSequencer {
    async fn next_folio(&self) -> Result<Folio, SequencerError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(Folio::new(format!("Q-{}", n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn issues_monotonic_folios() {
        let sequencer = CounterFolioSequencer::new();
        assert_eq!(sequencer.next_folio().await.unwrap().as_str(), "Q-1000");
        assert_eq!(sequencer.next_folio().await.unwrap().as_str(), "Q-1001");
        assert_eq!(sequencer.next_folio().await.unwrap().as_str(), "Q-1002");
    }

    #[tokio::test]
    async fn concurrent_callers_never_share_a_folio() {
        let sequencer = Arc::new(CounterFolioSequencer::new());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let sequencer = Arc::clone(&sequencer);
                tokio::spawn(async move { sequencer.next_folio().await.unwrap() })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let folio = handle.await.unwrap();
            assert!(seen.insert(folio.to_string()), "duplicate folio issued");
        }
        assert_eq!(seen.len(), 32);
    }
}
