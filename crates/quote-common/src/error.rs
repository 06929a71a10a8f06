//! Error types for OpenQuote

use thiserror::Error;

/// Platform-wide error taxonomy.
///
/// Every fallible operation on the platform resolves to exactly one of
/// these classes; the API layer maps each class to one HTTP status.
#[derive(Error, Debug, Clone)]
pub enum QuoteError {
    /// Malformed input: empty items, non-positive quantity or price,
    /// unknown or inactive client.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown folio or id. Carries no detail: the caller must not be able
    /// to distinguish "wrong identifier" from "exists but inaccessible".
    #[error("not registered")]
    NotFound,

    /// Illegal status change attempted; the record is left unchanged.
    #[error("invalid status transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Folio or version collision under concurrency.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Gateway rejection. The rule that fired is withheld from the caller.
    #[error("access denied")]
    AccessDenied,

    /// A dependency (sequencer, registry, renderer) is temporarily
    /// unreachable. Retryable.
    #[error("temporarily unavailable: {0}")]
    Transient(String),
}

impl QuoteError {
    /// Whether a bounded retry may resolve this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound => "not_registered",
            Self::InvalidStateTransition { .. } => "invalid_state_transition",
            Self::Conflict(_) => "conflict",
            Self::AccessDenied => "access_denied",
            Self::Transient(_) => "transient_error",
        }
    }
}

/// Result type for OpenQuote
pub type QuoteResult<T> = Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_the_only_retryable_class() {
        assert!(QuoteError::Transient("registry down".into()).is_transient());
        assert!(!QuoteError::AccessDenied.is_transient());
        assert!(!QuoteError::Conflict("v2".into()).is_transient());
    }

    #[test]
    fn opaque_classes_carry_no_detail() {
        assert_eq!(QuoteError::NotFound.to_string(), "not registered");
        assert_eq!(QuoteError::AccessDenied.to_string(), "access denied");
    }
}
