//! Data Transfer Objects (DTOs)
//!
//! Objects for transferring data across boundaries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{ItemDetail, Quote, QuoteItem};
use crate::ports::outbound::ClientRecord;

// =============================================================================
// Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateQuoteCommand {
    pub client_id: String,
    pub currency: Option<String>,
    pub items: Vec<QuoteItemDraft>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub validity_days: Option<u32>,
    /// Submit on creation (`Open`) instead of leaving a `Draft`.
    #[serde(default)]
    pub submit: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteItemDraft {
    pub part_number: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub spec_url: Option<String>,
    #[serde(default)]
    pub detail: ItemDetail,
}

// =============================================================================
// Views (Read Models)
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteView {
    pub id: String,
    pub folio: String,
    pub version: u32,
    pub parent_folio: Option<String>,
    pub client_id: String,
    pub items: Vec<QuoteItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub validity_days: u32,
}

impl From<&Quote> for QuoteView {
    fn from(quote: &Quote) -> Self {
        Self {
            id: quote.id().to_string(),
            folio: quote.folio().to_string(),
            version: quote.version(),
            parent_folio: quote.parent_folio().map(|f| f.to_string()),
            client_id: quote.client_id().to_string(),
            items: quote.items().to_vec(),
            subtotal: quote.subtotal().amount(),
            tax: quote.tax().amount(),
            total: quote.total().amount(),
            currency: quote.currency().code().to_string(),
            status: quote.status().to_string(),
            created_at: quote.created_at(),
            notes: quote.notes().map(str::to_string),
            terms: quote.terms().map(str::to_string),
            validity_days: quote.validity_days(),
        }
    }
}

/// The slice of a client the printable artifact shows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientSummary {
    pub legal_name: String,
    pub tax_id: String,
}

impl From<&ClientRecord> for ClientSummary {
    fn from(record: &ClientRecord) -> Self {
        Self {
            legal_name: record.legal_name.clone(),
            tax_id: record.tax_id.clone(),
        }
    }
}

/// Immutable render input: everything the document renderer sees.
///
/// Snapshots exclude anything that varies between renders of the same
/// revision, so re-rendering for audit reproduces the artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub folio: String,
    pub version: u32,
    pub client: ClientSummary,
    pub items: Vec<QuoteItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub validity_days: u32,
}

impl QuoteSnapshot {
    pub fn from_parts(quote: &Quote, client: &ClientRecord) -> Self {
        Self {
            folio: quote.folio().to_string(),
            version: quote.version(),
            client: ClientSummary::from(client),
            items: quote.items().to_vec(),
            subtotal: quote.subtotal().amount(),
            tax: quote.tax().amount(),
            total: quote.total().amount(),
            currency: quote.currency().code().to_string(),
            notes: quote.notes().map(str::to_string),
            terms: quote.terms().map(str::to_string),
            validity_days: quote.validity_days(),
        }
    }
}
