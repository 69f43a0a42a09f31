//! # Error Types
//!
//! Domain-specific error types for linen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  linen-core errors (this file)                                         │
//! │  ├── CoreError        - One variant per engine error kind              │
//! │  ├── ValidationError  - Text field failures (names, details, ids)      │
//! │  └── ErrorKind        - Machine-readable code carried to the caller    │
//! │                                                                         │
//! │  linen-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, stale batch writes          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → HTTP layer (external)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending value in the message
//! 3. Every error exposes a [`ErrorKind`] so transports never parse messages
//! 4. The engine rejects bad input; it never clamps or coerces

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Engine errors.
///
/// Every variant is detected at the input boundary, before any totals are
/// produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A monetary amount was NaN or infinite.
    #[error("Invalid amount: {value} is not a finite number")]
    InvalidAmount { value: f64 },

    /// The item payload is not a well-formed list of item records.
    ///
    /// ## When This Occurs
    /// - The payload is not a JSON array
    /// - An entry is missing a field or has the wrong type
    /// - A quantity is fractional (e.g. `2.5`)
    #[error("Invalid items: {reason}")]
    InvalidItems { reason: String },

    /// Paper batch id year outside the supported range.
    #[error("Invalid year {year}: must be between {min} and {max}")]
    InvalidYear { year: i32, min: i32, max: i32 },

    /// Paper batch id month outside 1-12.
    #[error("Invalid month {month}: must be between 1 and 12")]
    InvalidMonth { month: u32 },

    /// Paper batch id sequence outside 1-999.
    #[error("Invalid sequence {sequence}: must be between 1 and 999")]
    InvalidSequence { sequence: i64 },

    /// Quantity outside `[0, max]`.
    #[error("{field} {value} is out of range (0 to {max})")]
    InvalidQuantity {
        field: String,
        value: i64,
        max: i64,
    },

    /// Unit price negative or above the ceiling.
    #[error("Invalid price {value}: must be between 0.00 and {max}")]
    InvalidPrice { value: String, max: String },

    /// Illegal batch status move.
    ///
    /// ## User Workflow
    /// ```text
    /// Dashboard: batch PB-2024-01-006 is "completed"
    ///      │
    ///      ▼
    /// Operator picks "washing"
    ///      │
    ///      ▼
    /// InvalidTransition { from: "completed", to: "washing", .. }
    ///      │
    ///      ▼
    /// UI shows: "Batches cannot move backwards"
    /// ```
    #[error("Cannot move batch from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            CoreError::InvalidItems { .. } => ErrorKind::InvalidItems,
            CoreError::InvalidYear { .. } => ErrorKind::InvalidYear,
            CoreError::InvalidMonth { .. } => ErrorKind::InvalidMonth,
            CoreError::InvalidSequence { .. } => ErrorKind::InvalidSequence,
            CoreError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            CoreError::InvalidPrice { .. } => ErrorKind::InvalidPrice,
            CoreError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            CoreError::Validation(_) => ErrorKind::ValidationError,
        }
    }

    /// Shorthand for an `InvalidItems` error.
    pub fn invalid_items(reason: impl Into<String>) -> Self {
        CoreError::InvalidItems {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Error Kind
// =============================================================================

/// Machine-readable error codes.
///
/// ## Serialization
/// ```json
/// { "kind": "INVALID_PRICE", "message": "Invalid price 1200.00: ..." }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidAmount,
    InvalidItems,
    InvalidYear,
    InvalidMonth,
    InvalidSequence,
    InvalidQuantity,
    InvalidPrice,
    InvalidTransition,
    ValidationError,
}

impl ErrorKind {
    /// Suggested HTTP status for the transport layer.
    ///
    /// Illegal transitions conflict with the batch's current state (409);
    /// everything else is a bad request (400).
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidTransition => 409,
            _ => 400,
        }
    }
}

/// Serializable `{kind, message}` pair handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CoreError> for ErrorBody {
    fn from(err: &CoreError) -> Self {
        ErrorBody {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Text-field validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidQuantity {
            field: "quantity_sent".to_string(),
            value: 10_001,
            max: 10_000,
        };
        assert_eq!(
            err.to_string(),
            "quantity_sent 10001 is out of range (0 to 10000)"
        );

        let err = CoreError::InvalidMonth { month: 13 };
        assert_eq!(err.to_string(), "Invalid month 13: must be between 1 and 12");
    }

    #[test]
    fn test_kinds_and_status_codes() {
        let err = CoreError::InvalidTransition {
            from: "completed".to_string(),
            to: "washing".to_string(),
            reason: "batches cannot move backwards".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(err.kind().http_status(), 409);
        assert_eq!(CoreError::invalid_items("x").kind().http_status(), 400);
    }

    #[test]
    fn test_error_body_serialization() {
        let err = CoreError::InvalidAmount { value: f64::NAN };
        let body = ErrorBody::from(&err);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "INVALID_AMOUNT");
        assert!(json["message"].as_str().unwrap().contains("not a finite number"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::ValidationError);
    }
}
