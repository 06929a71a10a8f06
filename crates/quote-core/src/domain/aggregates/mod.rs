//! Aggregates module

pub mod quote;

pub use quote::{
    ItemDetail, ItemDraft, Quote, QuoteDomainError, QuoteDraft, QuoteItem, QuoteStatus,
};
