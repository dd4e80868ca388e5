//! # Document Store
//!
//! Persistence for invoices and quotations behind one object-safe trait.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DocumentService                                                       │
//! │       │                                                                 │
//! │       │  Arc<dyn DocumentStore>                                        │
//! │       ▼                                                                 │
//! │  DocumentStore                                                         │
//! │  ├── get / insert / update / remove                                    │
//! │  ├── list_by_owner / list_by_status                                    │
//! │  ├── next_sequence (INV-/QUO- numbers)                                 │
//! │  └── commit_conversion (quotation + invoice, all or nothing)           │
//! │       │                                                                 │
//! │       ├──► SqliteDocumentStore    (sqlx, one table, JSON payload)      │
//! │       └──► InMemoryDocumentStore  (tests and tooling)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores see documents only as [`DocumentRecord`]s: an opaque JSON payload
//! plus the few columns needed for lookups. Writes are last-write-wins.

pub mod memory;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod contract;

use async_trait::async_trait;
use billbook_core::{Document, DocumentKind, DocumentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DbError, DbResult};

pub use memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

// =============================================================================
// Record
// =============================================================================

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: String,
    pub kind: DocumentKind,
    pub owner_id: String,
    pub number: String,
    pub status: String,
    /// The full document as JSON.
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn from_document<S>(doc: &Document<S>) -> DbResult<Self>
    where
        S: DocumentStatus + Serialize,
    {
        Ok(DocumentRecord {
            id: doc.id.clone(),
            kind: S::KIND,
            owner_id: doc.owner_id.clone(),
            number: doc.number.clone(),
            status: doc.status.name().to_string(),
            payload: serde_json::to_string(doc)?,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    pub fn to_document<S>(&self) -> DbResult<Document<S>>
    where
        S: DocumentStatus + DeserializeOwned,
    {
        if self.kind != S::KIND {
            return Err(DbError::Serialization(format!(
                "record {} is a {}, not a {}",
                self.id, self.kind, S::KIND
            )));
        }
        Ok(serde_json::from_str(&self.payload)?)
    }
}

// =============================================================================
// Store Trait
// =============================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, kind: DocumentKind, id: &str) -> DbResult<Option<DocumentRecord>>;

    /// Fails with `UniqueViolation` if the id or the `(kind, number)` pair is taken.
    async fn insert(&self, record: &DocumentRecord) -> DbResult<()>;

    /// Overwrites an existing record. Fails with `NotFound` if it is missing.
    async fn update(&self, record: &DocumentRecord) -> DbResult<()>;

    /// Returns whether a record was removed.
    async fn remove(&self, kind: DocumentKind, id: &str) -> DbResult<bool>;

    /// All documents of `kind` owned by `owner_id`, newest first.
    async fn list_by_owner(&self, kind: DocumentKind, owner_id: &str)
        -> DbResult<Vec<DocumentRecord>>;

    /// Like [`DocumentStore::list_by_owner`], restricted to one status.
    async fn list_by_status(
        &self,
        kind: DocumentKind,
        owner_id: &str,
        status: &str,
    ) -> DbResult<Vec<DocumentRecord>>;

    /// Allocates the next number in the `(kind, date)` sequence, starting at 1.
    async fn next_sequence(&self, kind: DocumentKind, date: NaiveDate) -> DbResult<u32>;

    /// Updates the quotation and inserts the invoice as one atomic write.
    /// On error neither is stored.
    async fn commit_conversion(
        &self,
        quotation: &DocumentRecord,
        invoice: &DocumentRecord,
    ) -> DbResult<()>;
}

// =============================================================================
// Unit Tests
// =============================================================================
