//! # SQLite Document Store
//!
//! ## Conversion Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                            │
//! │                                                                 │
//! │  1. UPDATE documents SET status = 'converted', payload = ?     │
//! │     WHERE id = <quotation> AND kind = 'quotation'              │
//! │                                                                 │
//! │  2. INSERT INTO documents (... 'invoice' ...)                  │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!      │
//!      ▼
//! COMMIT ← both rows or neither
//! ```

use async_trait::async_trait;
use billbook_core::DocumentKind;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{DocumentRecord, DocumentStore};
use crate::error::{DbError, DbResult};

const SELECT_COLUMNS: &str =
    "SELECT id, kind, owner_id, number, status, payload, created_at, updated_at FROM documents";

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    kind: String,
    owner_id: String,
    number: String,
    status: String,
    payload: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for DocumentRecord {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> DbResult<Self> {
        let kind = row
            .kind
            .parse::<DocumentKind>()
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        Ok(DocumentRecord {
            id: row.id,
            kind,
            owner_id: row.owner_id,
            number: row.number,
            status: row.status,
            payload: row.payload,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<DocumentRow>) -> DbResult<Vec<DocumentRecord>> {
    rows.into_iter().map(DocumentRecord::try_from).collect()
}

/// [`DocumentStore`] backed by the `documents` table.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteDocumentStore { pool }
    }

    async fn insert_with<'e, E>(executor: E, record: &DocumentRecord) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO documents (
                id, kind, owner_id, number, status, payload, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(record.kind.as_str())
        .bind(&record.owner_id)
        .bind(&record.number)
        .bind(&record.status)
        .bind(&record.payload)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(executor)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: record.number.clone(),
            },
            other => other,
        })?;
        Ok(())
    }

    async fn update_with<'e, E>(executor: E, record: &DocumentRecord) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE documents SET
                owner_id = ?3,
                number = ?4,
                status = ?5,
                payload = ?6,
                updated_at = ?7
            WHERE id = ?1 AND kind = ?2
            "#,
        )
        .bind(&record.id)
        .bind(record.kind.as_str())
        .bind(&record.owner_id)
        .bind(&record.number)
        .bind(&record.status)
        .bind(&record.payload)
        .bind(record.updated_at)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(record.kind.as_str(), &record.id));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, kind: DocumentKind, id: &str) -> DbResult<Option<DocumentRecord>> {
        let row: Option<DocumentRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE kind = ?1 AND id = ?2"))
                .bind(kind.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(DocumentRecord::try_from).transpose()
    }

    async fn insert(&self, record: &DocumentRecord) -> DbResult<()> {
        debug!(kind = %record.kind, id = %record.id, number = %record.number, "Inserting document");
        Self::insert_with(&self.pool, record).await
    }

    async fn update(&self, record: &DocumentRecord) -> DbResult<()> {
        debug!(kind = %record.kind, id = %record.id, status = %record.status, "Updating document");
        Self::update_with(&self.pool, record).await
    }

    async fn remove(&self, kind: DocumentKind, id: &str) -> DbResult<bool> {
        debug!(kind = %kind, id = %id, "Removing document");
        let result = sqlx::query("DELETE FROM documents WHERE kind = ?1 AND id = ?2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(
        &self,
        kind: DocumentKind,
        owner_id: &str,
    ) -> DbResult<Vec<DocumentRecord>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE kind = ?1 AND owner_id = ?2 ORDER BY created_at DESC, id"
        ))
        .bind(kind.as_str())
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn list_by_status(
        &self,
        kind: DocumentKind,
        owner_id: &str,
        status: &str,
    ) -> DbResult<Vec<DocumentRecord>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE kind = ?1 AND owner_id = ?2 AND status = ?3 \
             ORDER BY created_at DESC, id"
        ))
        .bind(kind.as_str())
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn next_sequence(&self, kind: DocumentKind, date: NaiveDate) -> DbResult<u32> {
        let period = date.format("%Y%m%d").to_string();

        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO document_sequences (kind, period, value) VALUES (?1, ?2, 1)
            ON CONFLICT (kind, period) DO UPDATE SET value = value + 1
            RETURNING value
            "#,
        )
        .bind(kind.as_str())
        .bind(&period)
        .fetch_one(&self.pool)
        .await?;

        u32::try_from(value).map_err(|_| DbError::Internal(format!("sequence overflow: {value}")))
    }

    async fn commit_conversion(
        &self,
        quotation: &DocumentRecord,
        invoice: &DocumentRecord,
    ) -> DbResult<()> {
        debug!(
            quotation_id = %quotation.id,
            invoice_id = %invoice.id,
            "Committing quotation conversion"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Dropping `tx` on an early return rolls back.
        Self::update_with(&mut *tx, quotation).await?;
        Self::insert_with(&mut *tx, invoice).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
