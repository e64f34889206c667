//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Where Errors Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  View                        Rust Backend                               │
//! │  ────                        ────────────                               │
//! │                                                                         │
//! │  toggle_entry(12 MSI, #7)                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Fetch Error? ─── SourceError::Io(..) ─────────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Engine Error? ─── CoreError::EntryNotFound ───── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Entry 7 not found in ..." }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use deferral_core::{CoreError, ValidationError};

use crate::source::SourceError;

/// Message shown in the banner for any failed fetch.
pub const FETCH_FAILURE_MESSAGE: &str = "We could not load your information. Please try again later.";

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "EMPTY_SELECTION",
///   "message": "No payments selected"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Stable code the view matches on
    pub code: ErrorCode,

    /// Text for the banner or inline message
    pub message: String,
}

/// What went wrong, for the view to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A data source fetch failed
    FetchFailure,

    /// Entry or history record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// The action needs at least one selected payment
    EmptySelection,

    /// The receipt was opened without a confirmation
    MissingConfirmation,

    /// Confirm was attempted before accepting the terms
    TermsNotAccepted,
}

impl ApiError {
    /// Error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// `NOT_FOUND` for a missing entry, simulated payment or history record.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// `MISSING_CONFIRMATION` for a receipt requested before any confirm.
    pub fn missing_confirmation() -> Self {
        ApiError::new(ErrorCode::MissingConfirmation, "No confirmation to show")
    }
}

/// Converts data source errors to API errors.
///
/// The cause is logged; the view only gets the generic banner message.
impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        tracing::error!("Data source failure: {}", err);
        ApiError::new(ErrorCode::FetchFailure, FETCH_FAILURE_MESSAGE)
    }
}

/// Engine failures keep their message; lookups become `NOT_FOUND`.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EntryNotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::UnsupportedTerm(_) => ApiError::validation(err.to_string()),
            CoreError::EmptySelection => ApiError::new(ErrorCode::EmptySelection, err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use deferral_core::{BucketKey, OfferType, Term};

    #[test]
    fn test_error_code_serialization() {
        let err = ApiError::missing_confirmation();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MISSING_CONFIRMATION");
        assert_eq!(json["message"], "No confirmation to show");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::EntryNotFound {
            bucket: BucketKey::new(OfferType::Msi, Term::M12),
            id: 7,
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Entry 7 not found in bucket 12 MSI");

        let err: ApiError = CoreError::EmptySelection.into();
        assert_eq!(err.code, ErrorCode::EmptySelection);
        assert_eq!(err.message, "No payments selected");

        let err: ApiError = CoreError::UnsupportedTerm("3".to_string()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_source_error_hides_details() {
        let err: ApiError = SourceError::Unavailable("connection reset by peer".to_string()).into();
        assert_eq!(err.code, ErrorCode::FetchFailure);
        assert_eq!(err.message, FETCH_FAILURE_MESSAGE);
        assert_eq!(err.to_string(), format!("[FetchFailure] {}", FETCH_FAILURE_MESSAGE));
    }
}
