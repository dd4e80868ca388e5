//! # Error Types
//!
//! Domain-specific error types for billbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billbook-core errors (this file)                                      │
//! │  ├── ValidationError  - A field failed a rule (form or payment)        │
//! │  └── CoreError        - Lifecycle / ownership / numbering rules        │
//! │                                                                         │
//! │  billbook-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - What callers of the workflow see               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → Caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are checked in a fixed order and the first failure is returned;
//! errors are never aggregated.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// A single field failed validation.
///
/// Every variant names the offending field so forms can attach the message
/// to the right input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range (rates: 0–100).
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value does not match the expected pattern (PAN, GST, UTR, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Field must not be supplied in this context.
    ///
    /// ## When This Occurs
    /// - A transaction id is sent with a cash payment
    /// - Payment details are sent on a transition that does not settle
    #[error("{field}: {reason}")]
    Forbidden { field: String, reason: String },

    /// Duplicate value (e.g., two line items with the same id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Forbidden { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the lifecycle and workflow rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Input failed a field rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested status is not reachable from the current one.
    ///
    /// ## Example
    /// ```text
    /// quotation: draft ──X──► accepted   (must go through "sent")
    /// invoice:   paid  ──X──► paid       (terminal, no self-edge)
    /// ```
    #[error("Cannot move {kind} from {from} to {to}")]
    IllegalTransition {
        kind: &'static str,
        from: String,
        to: String,
    },

    /// Document is in a terminal status and can no longer be edited.
    #[error("{kind} is {status} and can no longer be edited")]
    NotEditable { kind: &'static str, status: String },

    /// Acting user does not own the document.
    #[error("Access denied to document {document_id}")]
    AccessDenied { document_id: String },

    /// A document number collides with one already in use.
    #[error("Document number {0} is already in use")]
    DuplicateNumber(String),
}

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
