//! In-memory [`DocumentStore`].
//!
//! Intended for tests and tooling. Every write takes the single write lock,
//! so a conversion is visible all at once or not at all.

use async_trait::async_trait;
use billbook_core::DocumentKind;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentRecord, DocumentStore};
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
struct Tables {
    // keyed by id alone, like the documents primary key
    documents: HashMap<String, DocumentRecord>,
    sequences: HashMap<(DocumentKind, NaiveDate), u32>,
}

impl Tables {
    fn check_insert(&self, record: &DocumentRecord) -> DbResult<()> {
        if self.documents.contains_key(&record.id) {
            return Err(DbError::duplicate("documents.id", &record.id));
        }
        let number_taken = self
            .documents
            .values()
            .any(|r| r.kind == record.kind && r.number == record.number);
        if number_taken {
            return Err(DbError::duplicate("documents.kind, documents.number", &record.number));
        }
        Ok(())
    }

    fn check_update(&self, record: &DocumentRecord) -> DbResult<()> {
        if self.find(record.kind, &record.id).is_none() {
            return Err(DbError::not_found(record.kind.as_str(), &record.id));
        }
        let number_taken = self
            .documents
            .values()
            .any(|r| r.kind == record.kind && r.number == record.number && r.id != record.id);
        if number_taken {
            return Err(DbError::duplicate("documents.kind, documents.number", &record.number));
        }
        Ok(())
    }

    fn find(&self, kind: DocumentKind, id: &str) -> Option<&DocumentRecord> {
        self.documents.get(id).filter(|r| r.kind == kind)
    }

    fn put(&mut self, record: &DocumentRecord) {
        self.documents.insert(record.id.clone(), record.clone());
    }

    fn select<F>(&self, kind: DocumentKind, owner_id: &str, filter: F) -> Vec<DocumentRecord>
    where
        F: Fn(&DocumentRecord) -> bool,
    {
        let mut records: Vec<DocumentRecord> = self
            .documents
            .values()
            .filter(|r| r.kind == kind && r.owner_id == owner_id && filter(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        records
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    tables: RwLock<Tables>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, kind: DocumentKind, id: &str) -> DbResult<Option<DocumentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.find(kind, id).cloned())
    }

    async fn insert(&self, record: &DocumentRecord) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_insert(record)?;
        tables.put(record);
        Ok(())
    }

    async fn update(&self, record: &DocumentRecord) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_update(record)?;
        let created_at = tables
            .find(record.kind, &record.id)
            .map(|existing| existing.created_at)
            .unwrap_or(record.created_at);
        let mut stored = record.clone();
        stored.created_at = created_at;
        tables.put(&stored);
        Ok(())
    }

    async fn remove(&self, kind: DocumentKind, id: &str) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.find(kind, id).is_none() {
            return Ok(false);
        }
        Ok(tables.documents.remove(id).is_some())
    }

    async fn list_by_owner(
        &self,
        kind: DocumentKind,
        owner_id: &str,
    ) -> DbResult<Vec<DocumentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.select(kind, owner_id, |_| true))
    }

    async fn list_by_status(
        &self,
        kind: DocumentKind,
        owner_id: &str,
        status: &str,
    ) -> DbResult<Vec<DocumentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.select(kind, owner_id, |r| r.status == status))
    }

    async fn next_sequence(&self, kind: DocumentKind, date: NaiveDate) -> DbResult<u32> {
        let mut tables = self.tables.write().await;
        let value = tables.sequences.entry((kind, date)).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn commit_conversion(
        &self,
        quotation: &DocumentRecord,
        invoice: &DocumentRecord,
    ) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_update(quotation)?;
        tables.check_insert(invoice)?;
        tables.put(quotation);
        tables.put(invoice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::contract;

    #[tokio::test]
    async fn test_insert_get_update_remove() {
        contract::insert_get_update_remove(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_duplicate_number_is_rejected() {
        contract::duplicate_number_is_rejected(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_id_is_unique_across_kinds() {
        contract::id_is_unique_across_kinds(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        contract::update_missing_is_not_found(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_listing() {
        contract::listing(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_sequences() {
        contract::sequences(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_conversion_commits_both() {
        contract::conversion_commits_both(&InMemoryDocumentStore::new()).await;
    }

    #[tokio::test]
    async fn test_conversion_is_all_or_nothing() {
        let store = InMemoryDocumentStore::new();
        contract::conversion_is_all_or_nothing(&store).await;
        assert_eq!(store.len().await, 2);
    }
}
