//! Credential Store
//!
//! One-time, time-bounded credentials. Redemption removes the entry
//! atomically, so two racing redemptions of the same token cannot both
//! succeed.

use chrono::{Duration, Utc};

use quote_common::Email;

use crate::AccessCredential;

/// Issued-credential store
pub struct CredentialStore {
    tokens: dashmap::DashMap<String, AccessCredential>,
    ttl: Duration,
}

impl CredentialStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: dashmap::DashMap::new(),
            ttl,
        }
    }

    /// Issue a credential scoped to exactly `scope`.
    pub fn issue(
        &self,
        subject: Email,
        approved_domain: String,
        scope: String,
        session_id: String,
    ) -> AccessCredential {
        let now = Utc::now();
        let credential = AccessCredential {
            token: uuid::Uuid::new_v4().to_string(),
            subject,
            approved_domain,
            issued_at: now,
            expires_at: now + self.ttl,
            scope,
            session_id,
        };

        self.tokens
            .insert(credential.token.clone(), credential.clone());
        credential
    }

    /// Consume a credential. Returns `None` for unknown, already-used, or
    /// expired tokens; in every case the token is gone afterwards.
    pub fn redeem(&self, token: &str) -> Option<AccessCredential> {
        let (_, credential) = self.tokens.remove(token)?;
        if credential.is_expired(Utc::now()) {
            return None;
        }
        Some(credential)
    }

    /// Drop expired credentials. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .tokens
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let count = expired.len();
        for token in expired {
            self.tokens.remove(&token);
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.tokens.len()
    }
}
