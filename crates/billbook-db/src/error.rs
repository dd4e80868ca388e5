//! # Error Types
//!
//! Error types for storage, configuration and the document workflow.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       │        CoreError (billbook-core)                                │
//! │       │             │                                                   │
//! │       ▼             ▼                                                   │
//! │  ServiceError ← What callers of DocumentService see                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::{CoreError, DocumentKind};
use thiserror::Error;

// =============================================================================
// Database Error
// =============================================================================

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two documents of the same kind with the same number
    /// - Inserting a document id that already exists
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin/commit failed; nothing from the transaction was kept.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use until the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored payload could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Connection-level failures that may succeed if the caller tries again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_) | DbError::PoolExhausted)
    }
}

/// The column list from `UNIQUE constraint failed: documents.kind, documents.number`.
fn unique_columns(message: &str) -> Option<&str> {
    message
        .strip_prefix("UNIQUE constraint failed: ")
        .map(str::trim)
}

/// ```text
/// UNIQUE constraint failed          → UniqueViolation (value filled in by the caller)
/// other constraint / SQL errors     → QueryFailed
/// PoolTimedOut                      → PoolExhausted
/// PoolClosed / Io                   → ConnectionFailed
/// RowNotFound                       → NotFound
/// anything else                     → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match unique_columns(db_err.message()) {
                Some(columns) => DbError::duplicate(columns, "unknown"),
                None => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),
            sqlx::Error::RowNotFound => DbError::not_found("row", "unknown"),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Configuration Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Service Error
// =============================================================================

/// Errors surfaced by [`crate::service::DocumentService`].
///
/// Business-rule failures, missing documents and storage failures are kept
/// apart so callers can tell "fix your input" from "try again later".
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A validation, lifecycle or ownership rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed. The operation had no effect unless it reports otherwise.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: DocumentKind, id: String },
}

impl ServiceError {
    pub fn not_found(kind: DocumentKind, id: impl Into<String>) -> Self {
        ServiceError::NotFound { kind, id: id.into() }
    }

    /// True only for transient storage failures. Nothing retries on its own;
    /// this is for the caller to decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Persistence(err) => err.is_transient(),
            _ => false,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::AccessDenied { .. }))
    }
}

impl From<billbook_core::ValidationError> for ServiceError {
    fn from(err: billbook_core::ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_core::ValidationError;

    #[test]
    fn test_retryable_only_for_transient_storage_failures() {
        assert!(ServiceError::from(DbError::PoolExhausted).is_retryable());
        assert!(ServiceError::from(DbError::ConnectionFailed("disk".into())).is_retryable());
        assert!(!ServiceError::from(DbError::duplicate("number", "INV-1")).is_retryable());

        let validation = ServiceError::from(ValidationError::Required {
            field: "paymentMode".to_string(),
        });
        assert!(!validation.is_retryable());
        assert!(matches!(validation, ServiceError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_unique_columns() {
        assert_eq!(
            unique_columns("UNIQUE constraint failed: documents.kind, documents.number"),
            Some("documents.kind, documents.number")
        );
        assert_eq!(unique_columns("CHECK constraint failed: kind"), None);
    }

    #[test]
    fn test_error_messages() {
        let err = ServiceError::not_found(DocumentKind::Quotation, "quo-1");
        assert_eq!(err.to_string(), "quotation not found: quo-1");

        let err = DbError::from(serde_json::from_str::<u32>("x").unwrap_err());
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
