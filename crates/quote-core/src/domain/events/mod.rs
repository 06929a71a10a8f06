//! Domain Events
//!
//! Events raised by the quote aggregate to communicate state changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::aggregates::QuoteStatus;
use crate::domain::value_objects::{EntityId, Folio};

/// All domain events in the quote bounded context
#[derive(Clone, Debug)]
pub enum QuoteEvent {
    Created {
        quote_id: EntityId,
        folio: Folio,
        client_id: EntityId,
        total: Decimal,
        status: QuoteStatus,
        created_at: DateTime<Utc>,
    },

    Revised {
        quote_id: EntityId,
        folio: Folio,
        version: u32,
        created_at: DateTime<Utc>,
    },

    StatusChanged {
        quote_id: EntityId,
        folio: Folio,
        from: QuoteStatus,
        to: QuoteStatus,
        changed_at: DateTime<Utc>,
    },
}

impl QuoteEvent {
    /// Get the aggregate ID this event belongs to
    pub fn aggregate_id(&self) -> &EntityId {
        match self {
            Self::Created { quote_id, .. } => quote_id,
            Self::Revised { quote_id, .. } => quote_id,
            Self::StatusChanged { quote_id, .. } => quote_id,
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "quote.created",
            Self::Revised { .. } => "quote.revised",
            Self::StatusChanged { .. } => "quote.status_changed",
        }
    }
}
