//! Domain Admission
//!
//! Decides whether a submitted email address belongs to a legitimate
//! business recipient. The decision carries the rule that fired for the
//! audit trail; callers must not forward it to the requester.

use std::collections::HashSet;
use std::sync::Arc;

use quote_common::{Email, QuoteError, QuoteResult, RetryPolicy};
use quote_core::{ClientRegistry, RegistryError};

/// Generic consumer mail providers that can never establish a business
/// relationship, whatever the registry says.
const CONSUMER_DOMAINS: &[&str] = &[
    "gmail.com",
    "hotmail.com",
    "outlook.com",
    "yahoo.com",
    "live.com",
    "icloud.com",
    "aol.com",
    "protonmail.com",
];

/// The concrete rule behind a decision. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRule {
    ConsumerDomain,
    OperatorDomain,
    RegisteredClientDomain,
    UnknownDomain,
}

/// Outcome of one admission check
#[derive(Debug, Clone)]
pub enum AdmissionDecision {
    Accepted {
        domain: String,
        rule: AdmissionRule,
    },
    Denied {
        rule: AdmissionRule,
    },
}

/// Domain-based admission control
pub struct DomainAdmission {
    deny: HashSet<String>,
    allow: HashSet<String>,
    registry: Arc<dyn ClientRegistry>,
    retry: RetryPolicy,
}

impl DomainAdmission {
    /// Build with the fixed consumer deny-list and the given operator
    /// allow-list.
    pub fn new(registry: Arc<dyn ClientRegistry>, operator_domains: Vec<String>) -> Self {
        Self {
            deny: CONSUMER_DOMAINS.iter().map(|d| d.to_string()).collect(),
            allow: operator_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            registry,
            retry: RetryPolicy::default(),
        }
    }

    /// Evaluate one email address.
    ///
    /// A registry outage propagates as `Transient`: the gateway fails
    /// closed without recording a permanent denial against the caller.
    pub async fn evaluate(&self, email: &Email) -> QuoteResult<AdmissionDecision> {
        let domain = email.domain().to_string();

        // the deny-list wins over every other check, including a
        // coincidental registry match for the same address
        if self.deny.contains(&domain) {
            return Ok(AdmissionDecision::Denied {
                rule: AdmissionRule::ConsumerDomain,
            });
        }

        if self.allow.contains(&domain) {
            return Ok(AdmissionDecision::Accepted {
                domain,
                rule: AdmissionRule::OperatorDomain,
            });
        }

        let registry = Arc::clone(&self.registry);
        let lookup_domain = domain.clone();
        let client = self
            .retry
            .run(|| {
                let registry = Arc::clone(&registry);
                let domain = lookup_domain.clone();
                async move {
                    registry
                        .find_active_by_domain(&domain)
                        .await
                        .map_err(|e| match e {
                            RegistryError::Unavailable(msg) => QuoteError::Transient(msg),
                        })
                }
            })
            .await?;

        match client {
            Some(record) => {
                tracing::debug!(domain = %domain, client = %record.id, "domain matches active client");
                Ok(AdmissionDecision::Accepted {
                    domain,
                    rule: AdmissionRule::RegisteredClientDomain,
                })
            }
            None => Ok(AdmissionDecision::Denied {
                rule: AdmissionRule::UnknownDomain,
            }),
        }
    }
}
