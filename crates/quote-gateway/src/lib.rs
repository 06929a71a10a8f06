//! OpenQuote Access Gateway (OQAG)
//!
//! Decides, under adversarial conditions, whether an arbitrary email
//! address deserves a time-boxed, scope-limited credential to view a
//! specific quote document, then issues and validates that credential.
//!
//! # Admission order
//! 1. Consumer-domain deny-list — overrides everything
//! 2. Operator allow-list — immediate accept
//! 3. Client registry — accept only for an active client's contact domain
//!
//! Rejections are opaque to the caller; the rule that fired lives only in
//! the audit trail and debug logs. A registry outage fails closed but
//! surfaces as retryable, so legitimate users are not mistaken for
//! rejected ones.
//!
//! # Viewer lifecycle
//! ```text
//! Unauthenticated ──(email accepted)──► PendingVerification
//!        ▲                                      │
//!        │ expiry / logout                      │ credential redeemed
//!        └────────────── Authenticated { scope } ◄┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quote_common::Email;

// Module declarations
pub mod admission;
pub mod audit;
pub mod credential;
pub mod gateway;
pub mod ratelimit;
pub mod session;

pub use admission::{AdmissionDecision, AdmissionRule, DomainAdmission};
pub use audit::{AdmissionAudit, AuditOutcome, AuditRecord};
pub use credential::CredentialStore;
pub use gateway::{AccessGateway, AccessGrant, GatewayConfig, Redemption};
pub use ratelimit::{EmailRateLimiter, RateLimitConfig};
pub use session::{SessionManager, ViewerSession};

// =============================================================================
// Core Types
// =============================================================================

/// One-time, time-bounded credential unlocking exactly one resource path.
///
/// The scope is fixed at issuance and never widened; it doubles as the
/// pending destination the caller lands on after redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCredential {
    pub token: String,
    pub subject: Email,
    pub approved_domain: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub scope: String,
    /// Pending viewer session this credential authenticates on redemption.
    pub session_id: String,
}

impl AccessCredential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Viewer access state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessState {
    Unauthenticated,
    PendingVerification,
    Authenticated { scope: String },
}
