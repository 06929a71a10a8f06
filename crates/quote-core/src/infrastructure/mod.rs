//! Infrastructure layer
//!
//! Concrete implementations of the outbound ports.

pub mod persistence;
pub mod render;
pub mod sequencer;

pub use persistence::{InMemoryClientRegistry, InMemoryQuoteRepository, TracingEventPublisher};
pub use render::PlainTextRenderer;
pub use sequencer::CounterFolioSequencer;
