//! Quote Aggregate
//!
//! Rich aggregate root for one member of a quote lineage. A quote is never
//! mutated after persistence; edits materialize as new revisions carrying
//! the same folio.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::events::QuoteEvent;
use crate::domain::services::TotalsService;
use crate::domain::value_objects::{Currency, EntityId, Folio, Money};

/// Quote aggregate root
#[derive(Clone, Debug)]
pub struct Quote {
    id: EntityId,
    folio: Folio,
    version: u32,
    parent_folio: Option<Folio>,
    client_id: EntityId,
    items: Vec<QuoteItem>,
    subtotal: Money,
    tax: Money,
    total: Money,
    status: QuoteStatus,
    created_at: DateTime<Utc>,
    notes: Option<String>,
    terms: Option<String>,
    validity_days: u32,
    events: Vec<QuoteEvent>,
}

impl Quote {
    /// Create the first member of a new lineage.
    ///
    /// Validates the draft, computes every line total and the quote totals
    /// from the items, and ignores any total figures the caller may have
    /// computed upstream.
    pub fn create(
        folio: Folio,
        client_id: EntityId,
        draft: QuoteDraft,
        submit: bool,
    ) -> Result<Self, QuoteDomainError> {
        let items = Self::validated_items(draft.items)?;
        let now = Utc::now();
        let id = EntityId::new();
        let status = if submit {
            QuoteStatus::Open
        } else {
            QuoteStatus::Draft
        };

        let mut quote = Self {
            id: id.clone(),
            folio: folio.clone(),
            version: 1,
            parent_folio: None,
            client_id: client_id.clone(),
            items,
            subtotal: Money::zero(draft.currency.clone()),
            tax: Money::zero(draft.currency.clone()),
            total: Money::zero(draft.currency),
            status,
            created_at: now,
            notes: draft.notes,
            terms: draft.terms,
            validity_days: draft.validity_days,
            events: vec![],
        };
        quote.recompute_totals();

        quote.raise_event(QuoteEvent::Created {
            quote_id: id,
            folio,
            client_id,
            total: quote.total.amount(),
            status,
            created_at: now,
        });

        Ok(quote)
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn folio(&self) -> &Folio { &self.folio }
    pub fn version(&self) -> u32 { self.version }
    pub fn parent_folio(&self) -> Option<&Folio> { self.parent_folio.as_ref() }
    pub fn client_id(&self) -> &EntityId { &self.client_id }
    pub fn items(&self) -> &[QuoteItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn tax(&self) -> &Money { &self.tax }
    pub fn total(&self) -> &Money { &self.total }
    pub fn status(&self) -> QuoteStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn notes(&self) -> Option<&str> { self.notes.as_deref() }
    pub fn terms(&self) -> Option<&str> { self.terms.as_deref() }
    pub fn validity_days(&self) -> u32 { self.validity_days }
    pub fn currency(&self) -> &Currency { self.total.currency() }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Derive the next revision of this lineage.
    ///
    /// Copies the mutable fields, carries the client over unchanged
    /// (re-targeting a revision to another client is forbidden), resets
    /// status to `Open`, and leaves this member untouched. The caller
    /// persists the child under a unique `(folio, version)` constraint;
    /// a concurrent revision racing to the same version loses there.
    pub fn revise(&self) -> Result<Quote, QuoteDomainError> {
        if self.status.is_terminal() {
            return Err(QuoteDomainError::TerminalParent(self.status));
        }

        let now = Utc::now();
        let id = EntityId::new();
        let version = self.version + 1;

        let mut child = Self {
            id: id.clone(),
            folio: self.folio.clone(),
            version,
            parent_folio: Some(self.folio.clone()),
            client_id: self.client_id.clone(),
            items: self.items.clone(),
            subtotal: self.subtotal.clone(),
            tax: self.tax.clone(),
            total: self.total.clone(),
            status: QuoteStatus::Open,
            created_at: now,
            notes: self.notes.clone(),
            terms: self.terms.clone(),
            validity_days: self.validity_days,
            events: vec![],
        };
        child.recompute_totals();

        child.raise_event(QuoteEvent::Revised {
            quote_id: id,
            folio: self.folio.clone(),
            version,
            created_at: now,
        });

        Ok(child)
    }

    /// Submit a draft for consideration.
    pub fn submit(&mut self) -> Result<(), QuoteDomainError> {
        self.transition_to(QuoteStatus::Open)
    }

    /// Mark as accepted by the client.
    pub fn accept(&mut self) -> Result<(), QuoteDomainError> {
        self.transition_to(QuoteStatus::Accepted)
    }

    /// Mark as rejected by the client. Terminal.
    pub fn reject(&mut self) -> Result<(), QuoteDomainError> {
        self.transition_to(QuoteStatus::Rejected)
    }

    /// Mark as invoiced. Terminal.
    pub fn invoice(&mut self) -> Result<(), QuoteDomainError> {
        self.transition_to(QuoteStatus::Invoiced)
    }

    /// Move into production.
    pub fn start_production(&mut self) -> Result<(), QuoteDomainError> {
        self.transition_to(QuoteStatus::InProduction)
    }

    /// Attempt a status transition.
    ///
    /// All-or-nothing: an illegal transition fails and leaves every field
    /// unchanged.
    pub fn transition_to(&mut self, next: QuoteStatus) -> Result<(), QuoteDomainError> {
        if !self.status.can_transition_to(next) {
            return Err(QuoteDomainError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }

        let from = self.status;
        let now = Utc::now();
        self.status = next;

        self.raise_event(QuoteEvent::StatusChanged {
            quote_id: self.id.clone(),
            folio: self.folio.clone(),
            from,
            to: next,
            changed_at: now,
        });

        Ok(())
    }

    /// Drain the uncommitted domain events.
    pub fn take_events(&mut self) -> Vec<QuoteEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Private
    // =========================================================================

    fn validated_items(drafts: Vec<ItemDraft>) -> Result<Vec<QuoteItem>, QuoteDomainError> {
        if drafts.is_empty() {
            return Err(QuoteDomainError::EmptyItems);
        }

        drafts
            .into_iter()
            .map(|draft| {
                if draft.quantity < 1 {
                    return Err(QuoteDomainError::ZeroQuantity {
                        part_number: draft.part_number,
                    });
                }
                if draft.unit_price < Decimal::ZERO {
                    return Err(QuoteDomainError::NegativePrice {
                        part_number: draft.part_number,
                    });
                }
                Ok(QuoteItem {
                    line_total: TotalsService::line_total(draft.quantity, draft.unit_price),
                    part_number: draft.part_number,
                    name: draft.name,
                    quantity: draft.quantity,
                    unit_price: draft.unit_price,
                    spec_url: draft.spec_url,
                    detail: draft.detail,
                })
            })
            .collect()
    }

    fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.line_total = TotalsService::line_total(item.quantity, item.unit_price);
        }
        let currency = self.total.currency().clone();
        let totals = TotalsService::compute(self.items.iter().map(|i| i.line_total));
        self.subtotal = Money::new(totals.subtotal, currency.clone());
        self.tax = Money::new(totals.tax, currency.clone());
        self.total = Money::new(totals.total, currency);
    }

    fn raise_event(&mut self, event: QuoteEvent) {
        self.events.push(event);
    }
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Quote lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Open,
    Accepted,
    Rejected,
    Invoiced,
    InProduction,
}

impl QuoteStatus {
    /// Legal transition table. Terminal states have no outgoing edges.
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Open)
                | (Open, Accepted)
                | (Open, Rejected)
                | (Open, InProduction)
                | (Accepted, Invoiced)
                | (Accepted, InProduction)
        )
    }

    /// Whether no outgoing transition exists.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Invoiced)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Invoiced => "invoiced",
            Self::InProduction => "in_production",
        }
    }

    /// Parse a status name as used on the wire.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "open" => Some(Self::Open),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "invoiced" => Some(Self::Invoiced),
            "in_production" => Some(Self::InProduction),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of a quote
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteItem {
    pub part_number: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub spec_url: Option<String>,
    pub detail: ItemDetail,
}

/// Category-specific item fields, one schema per category.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ItemDetail {
    #[default]
    Standard,
    Fabrication {
        material: String,
        finish: String,
    },
    Service {
        hours: u32,
    },
}

/// Unvalidated creation input for a new lineage
#[derive(Clone, Debug)]
pub struct QuoteDraft {
    pub items: Vec<ItemDraft>,
    pub currency: Currency,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub validity_days: u32,
}

/// Unvalidated line input
#[derive(Clone, Debug)]
pub struct ItemDraft {
    pub part_number: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub spec_url: Option<String>,
    pub detail: ItemDetail,
}

/// Quote domain failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteDomainError {
    EmptyItems,
    ZeroQuantity { part_number: String },
    NegativePrice { part_number: String },
    IllegalTransition { from: QuoteStatus, to: QuoteStatus },
    TerminalParent(QuoteStatus),
}

impl std::error::Error for QuoteDomainError {}

impl std::fmt::Display for QuoteDomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyItems => write!(f, "a quote requires at least one item"),
            Self::ZeroQuantity { part_number } => {
                write!(f, "item {} has a quantity below 1", part_number)
            }
            Self::NegativePrice { part_number } => {
                write!(f, "item {} has a negative unit price", part_number)
            }
            Self::IllegalTransition { from, to } => {
                write!(f, "cannot transition from {} to {}", from, to)
            }
            Self::TerminalParent(status) => {
                write!(f, "cannot revise a quote in terminal status {}", status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft_with(items: Vec<ItemDraft>) -> QuoteDraft {
        QuoteDraft {
            items,
            currency: Currency::CLP,
            notes: None,
            terms: Some("Net 30".into()),
            validity_days: 30,
        }
    }

    fn single_item(quantity: u32, unit_price: Decimal) -> Vec<ItemDraft> {
        vec![ItemDraft {
            part_number: "PN-001".into(),
            name: "Widget".into(),
            quantity,
            unit_price,
            spec_url: None,
            detail: ItemDetail::Standard,
        }]
    }

    fn create_test_quote(submit: bool) -> Quote {
        Quote::create(
            Folio::new("Q-1000"),
            EntityId::new(),
            draft_with(single_item(1, dec!(100))),
            submit,
        )
        .unwrap()
    }

    #[test]
    fn creation_computes_totals_server_side() {
        let quote = create_test_quote(true);
        assert_eq!(quote.version(), 1);
        assert!(quote.parent_folio().is_none());
        assert_eq!(quote.status(), QuoteStatus::Open);
        assert_eq!(quote.subtotal().amount(), dec!(100));
        assert_eq!(quote.tax().amount(), dec!(19));
        assert_eq!(quote.total().amount(), dec!(119));
        assert_eq!(quote.items()[0].line_total, dec!(100));
    }

    #[test]
    fn unsubmitted_creation_starts_as_draft() {
        let quote = create_test_quote(false);
        assert_eq!(quote.status(), QuoteStatus::Draft);
    }

    #[test]
    fn creation_rejects_empty_items() {
        let err = Quote::create(
            Folio::new("Q-1000"),
            EntityId::new(),
            draft_with(vec![]),
            true,
        )
        .unwrap_err();
        assert_eq!(err, QuoteDomainError::EmptyItems);
    }

    #[test]
    fn creation_rejects_zero_quantity() {
        let err = Quote::create(
            Folio::new("Q-1000"),
            EntityId::new(),
            draft_with(single_item(0, dec!(100))),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, QuoteDomainError::ZeroQuantity { .. }));
    }

    #[test]
    fn creation_rejects_negative_price() {
        let err = Quote::create(
            Folio::new("Q-1000"),
            EntityId::new(),
            draft_with(single_item(1, dec!(-1))),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, QuoteDomainError::NegativePrice { .. }));
    }

    #[test]
    fn revision_extends_the_lineage() {
        let parent = create_test_quote(true);
        let child = parent.revise().unwrap();

        assert_eq!(child.version(), 2);
        assert_eq!(child.folio(), parent.folio());
        assert_eq!(child.parent_folio(), Some(parent.folio()));
        assert_eq!(child.client_id(), parent.client_id());
        assert_eq!(child.status(), QuoteStatus::Open);
        assert_ne!(child.id(), parent.id());
        // parent untouched
        assert_eq!(parent.version(), 1);
        assert_eq!(parent.status(), QuoteStatus::Open);
    }

    #[test]
    fn revision_of_terminal_quote_is_rejected() {
        let mut parent = create_test_quote(true);
        parent.reject().unwrap();
        assert!(matches!(
            parent.revise(),
            Err(QuoteDomainError::TerminalParent(QuoteStatus::Rejected))
        ));
    }

    #[test]
    fn accepted_quote_cannot_reopen() {
        let mut quote = create_test_quote(true);
        quote.accept().unwrap();

        let err = quote.transition_to(QuoteStatus::Open).unwrap_err();
        assert!(matches!(err, QuoteDomainError::IllegalTransition { .. }));
        assert_eq!(quote.status(), QuoteStatus::Accepted);
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for terminal in [QuoteStatus::Rejected, QuoteStatus::Invoiced] {
            for next in [
                QuoteStatus::Draft,
                QuoteStatus::Open,
                QuoteStatus::Accepted,
                QuoteStatus::Rejected,
                QuoteStatus::Invoiced,
                QuoteStatus::InProduction,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn accepted_quote_can_be_invoiced_or_produced() {
        assert!(QuoteStatus::Accepted.can_transition_to(QuoteStatus::Invoiced));
        assert!(QuoteStatus::Accepted.can_transition_to(QuoteStatus::InProduction));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Rejected));
    }

    #[test]
    fn events_are_raised_and_drained() {
        let mut quote = create_test_quote(true);
        quote.accept().unwrap();

        let events = quote.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "quote.created");
        assert_eq!(events[1].event_type(), "quote.status_changed");
        assert!(quote.take_events().is_empty());
    }

    #[test]
    fn status_names_round_trip() {
        for status in [
            QuoteStatus::Draft,
            QuoteStatus::Open,
            QuoteStatus::Accepted,
            QuoteStatus::Rejected,
            QuoteStatus::Invoiced,
            QuoteStatus::InProduction,
        ] {
            assert_eq!(QuoteStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QuoteStatus::parse("shipped"), None);
    }
}
