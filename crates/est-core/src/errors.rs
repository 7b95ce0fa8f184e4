//! Cross-cutting error types for Estima.
//!
//! Storage-specific errors (`DatabaseError`) live in `est-db`; everything the
//! draft layer and costing engine can raise is defined here. The costing
//! engine itself is total — it never returns an error.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while constructing or validating an estimate draft.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A required field is missing or has an invalid value. Caller's fault,
    /// not retryable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A reference (binding slot, task slot, or role index) points at nothing.
    #[error("Unknown {kind} reference at index {index}")]
    UnknownReference { kind: &'static str, index: usize },

    /// A role rate is negative.
    #[error("Invalid {field}: {value} (rates must be >= 0)")]
    InvalidRate { field: &'static str, value: Decimal },
}
