//! Access Gateway
//!
//! Orchestrates the full admission flow: rate limit, domain admission,
//! credential issuance, redemption, and per-request authorization.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use quote_common::{Email, QuoteError, QuoteResult};
use quote_core::ClientRegistry;

use crate::admission::{AdmissionDecision, DomainAdmission};
use crate::audit::{AdmissionAudit, AuditOutcome};
use crate::credential::CredentialStore;
use crate::ratelimit::{EmailRateLimiter, RateLimitConfig};
use crate::session::SessionManager;

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Internal operator domains accepted without a registry lookup.
    pub operator_domains: Vec<String>,
    /// Credential lifetime.
    pub credential_ttl: Duration,
    /// Authenticated-session lifetime.
    pub session_ttl: Duration,
    pub rate_limit: RateLimitConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            operator_domains: vec![],
            credential_ttl: Duration::minutes(15),
            session_ttl: Duration::minutes(30),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// What an accepted requester receives: the one-time credential and the
/// destination redemption will land on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    pub token: String,
    pub destination: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of redeeming a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub session_id: String,
    pub destination: String,
}

/// The access gateway
pub struct AccessGateway {
    admission: DomainAdmission,
    credentials: CredentialStore,
    sessions: SessionManager,
    limiter: EmailRateLimiter,
    audit: AdmissionAudit,
}

impl AccessGateway {
    pub fn new(registry: Arc<dyn ClientRegistry>, config: GatewayConfig) -> Self {
        Self {
            admission: DomainAdmission::new(registry, config.operator_domains),
            credentials: CredentialStore::new(config.credential_ttl),
            sessions: SessionManager::new(config.session_ttl),
            limiter: EmailRateLimiter::new(config.rate_limit),
            audit: AdmissionAudit::new(),
        }
    }

    /// Decide whether `raw_email` may receive a credential for `resource`.
    ///
    /// Every rejection surfaces as the same opaque `AccessDenied`; only a
    /// registry outage differs, as a retryable `Transient`.
    pub async fn request_access(
        &self,
        raw_email: &str,
        resource: &str,
    ) -> QuoteResult<AccessGrant> {
        let email = match Email::parse(raw_email) {
            Ok(email) => email,
            Err(_) => {
                self.audit
                    .record(raw_email, AuditOutcome::Denied, None, None);
                return Err(QuoteError::AccessDenied);
            }
        };

        // rate limit before any registry traffic: an attacker probing
        // domains must not get unbounded lookups
        if !self.limiter.allow(email.as_str()) {
            self.audit
                .record(email.as_str(), AuditOutcome::Denied, None, None);
            return Err(QuoteError::AccessDenied);
        }

        match self.admission.evaluate(&email).await? {
            AdmissionDecision::Accepted { domain, rule } => {
                let session = self.sessions.start_pending(email.clone());
                let credential = self.credentials.issue(
                    email.clone(),
                    domain,
                    resource.to_string(),
                    session.id.clone(),
                );

                self.audit.record(
                    email.as_str(),
                    AuditOutcome::Accepted,
                    Some(rule),
                    Some(resource.to_string()),
                );
                tracing::info!(email = %email, resource, "access credential issued");

                Ok(AccessGrant {
                    token: credential.token,
                    destination: credential.scope,
                    expires_at: credential.expires_at,
                })
            }
            AdmissionDecision::Denied { rule } => {
                self.audit
                    .record(email.as_str(), AuditOutcome::Denied, Some(rule), None);
                Err(QuoteError::AccessDenied)
            }
        }
    }

    /// Exchange a one-time credential for an authenticated session landing
    /// on the originally requested resource.
    pub fn redeem(&self, token: &str) -> QuoteResult<Redemption> {
        let credential = match self.credentials.redeem(token) {
            Some(credential) => credential,
            None => {
                self.audit
                    .record("", AuditOutcome::RedemptionFailed, None, None);
                return Err(QuoteError::AccessDenied);
            }
        };

        let session = self
            .sessions
            .authenticate(&credential.session_id, credential.scope.clone())
            .ok_or(QuoteError::AccessDenied)?;

        self.audit.record(
            credential.subject.as_str(),
            AuditOutcome::Redeemed,
            None,
            Some(credential.scope.clone()),
        );

        Ok(Redemption {
            session_id: session.id,
            destination: credential.scope,
        })
    }

    /// Whether the session may read the resource at `path`.
    pub fn authorize(&self, session_id: &str, path: &str) -> QuoteResult<()> {
        if self.sessions.authorizes(session_id, path) {
            Ok(())
        } else {
            Err(QuoteError::AccessDenied)
        }
    }

    /// Explicit logout.
    pub fn logout(&self, session_id: &str) {
        self.sessions.logout(session_id);
    }

    /// Drop expired credentials and sessions.
    pub fn cleanup_expired(&self) -> usize {
        self.credentials.cleanup_expired() + self.sessions.cleanup_expired()
    }

    /// Internal audit trail.
    pub fn audit(&self) -> &AdmissionAudit {
        &self.audit
    }
}
