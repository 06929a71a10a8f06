//! Admission Audit Trail
//!
//! Internal record of every gateway decision, including the concrete rule
//! that fired. Callers only ever see opaque denials; this trail is where
//! operators reconstruct what actually happened.

use chrono::{DateTime, Utc};

use crate::admission::AdmissionRule;

/// What happened to one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Accepted,
    Denied,
    Redeemed,
    RedemptionFailed,
}

/// One audited gateway event
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub email: String,
    pub outcome: AuditOutcome,
    /// The rule behind an admission outcome; absent for redemption events.
    pub rule: Option<AdmissionRule>,
    pub scope: Option<String>,
}

/// Admission audit log
pub struct AdmissionAudit {
    records: dashmap::DashMap<String, AuditRecord>,
}

impl AdmissionAudit {
    pub fn new() -> Self {
        Self {
            records: dashmap::DashMap::new(),
        }
    }

    pub fn record(
        &self,
        email: &str,
        outcome: AuditOutcome,
        rule: Option<AdmissionRule>,
        scope: Option<String>,
    ) {
        let record = AuditRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            email: email.to_string(),
            outcome,
            rule,
            scope,
        };

        tracing::debug!(
            email = %record.email,
            outcome = ?record.outcome,
            rule = ?record.rule,
            "gateway decision"
        );
        self.records.insert(record.id.clone(), record);
    }

    /// All events for one address, newest first.
    pub fn for_email(&self, email: &str) -> Vec<AuditRecord> {
        let mut records: Vec<AuditRecord> = self
            .records
            .iter()
            .filter(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for AdmissionAudit {
    fn default() -> Self {
        Self::new()
    }
}
