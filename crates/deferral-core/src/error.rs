//! # Error Types
//!
//! Domain-specific error types for deferral-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  deferral-core errors (this file)                                      │
//! │  ├── CoreError        - Engine operation failures                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  deferral-app errors (separate crate)                                  │
//! │  ├── SourceError      - Data source (fetch) failures                   │
//! │  └── ApiError         - What the view layer sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → View                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed numeric offer fields are NOT errors: they are normalized to
//! `0.0` during classification. An empty selection is NOT an error either
//! at this level; callers gate their actions on the selection count.

use thiserror::Error;

use crate::classify::BucketKey;
use crate::model::PurchaseId;

// =============================================================================
// Core Error
// =============================================================================

/// Engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No entry with the given purchase id exists in the bucket.
    ///
    /// ## When This Occurs
    /// - The view toggled an entry after a reload rebuilt the buckets
    /// - The bucket key and purchase id come from different buckets
    #[error("Entry {id} not found in bucket {bucket}")]
    EntryNotFound { bucket: BucketKey, id: PurchaseId },

    /// The requested term is not offered by the simulator.
    #[error("Term {0} months is not available for simulation")]
    UnsupportedTerm(String),

    /// An operation that requires at least one selected entry received none.
    #[error("No payments selected")]
    EmptySelection,

    /// Input rejected by [`crate::validation`].
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input: a term, a purchase field.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Missing or blank field.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., non-numeric term).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value outside the accepted set (e.g. a 3-month simulator term).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result of an engine operation.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OfferType, Term};

    #[test]
    fn test_entry_and_term_messages() {
        let err = CoreError::EntryNotFound {
            bucket: BucketKey::new(OfferType::Mci, Term::M6),
            id: 42,
        };
        assert_eq!(err.to_string(), "Entry 42 not found in bucket 6 MCI");

        let err = CoreError::UnsupportedTerm("3".to_string());
        assert_eq!(
            err.to_string(),
            "Term 3 months is not available for simulation"
        );
    }

    #[test]
    fn test_validation_wraps_into_core_error() {
        let validation_err = ValidationError::Required {
            field: "term".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
