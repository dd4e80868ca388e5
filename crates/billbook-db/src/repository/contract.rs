//! Behaviour every [`DocumentStore`] must share. Each store's test module
//! runs these against its own implementation.

use billbook_core::DocumentKind;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::{DocumentRecord, DocumentStore};
use crate::error::DbError;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
}

pub(crate) fn record(
    kind: DocumentKind,
    id: &str,
    number: &str,
    owner_id: &str,
    status: &str,
    minutes: i64,
) -> DocumentRecord {
    let at = base_time() + Duration::minutes(minutes);
    DocumentRecord {
        id: id.to_string(),
        kind,
        owner_id: owner_id.to_string(),
        number: number.to_string(),
        status: status.to_string(),
        payload: format!(r#"{{"id":"{id}"}}"#),
        created_at: at,
        updated_at: at,
    }
}

pub(crate) async fn insert_get_update_remove(store: &dyn DocumentStore) {
    let inv = record(DocumentKind::Invoice, "inv-1", "INV-1", "user-1", "pending", 0);
    store.insert(&inv).await.unwrap();

    let loaded = store.get(DocumentKind::Invoice, "inv-1").await.unwrap();
    assert_eq!(loaded, Some(inv.clone()));
    // lookups are scoped to the kind
    assert!(store.get(DocumentKind::Quotation, "inv-1").await.unwrap().is_none());

    let mut paid = inv.clone();
    paid.status = "paid".to_string();
    paid.updated_at = inv.updated_at + Duration::hours(1);
    store.update(&paid).await.unwrap();

    let loaded = store
        .get(DocumentKind::Invoice, "inv-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, "paid");
    assert_eq!(loaded.updated_at, paid.updated_at);

    assert!(store.remove(DocumentKind::Invoice, "inv-1").await.unwrap());
    assert!(store.get(DocumentKind::Invoice, "inv-1").await.unwrap().is_none());
    assert!(!store.remove(DocumentKind::Invoice, "inv-1").await.unwrap());
}

pub(crate) async fn duplicate_number_is_rejected(store: &dyn DocumentStore) {
    let first = record(DocumentKind::Invoice, "inv-1", "INV-1", "user-1", "draft", 0);
    store.insert(&first).await.unwrap();

    let clash = record(DocumentKind::Invoice, "inv-2", "INV-1", "user-1", "draft", 1);
    let err = store.insert(&clash).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }), "got {err:?}");

    // numbers are unique per kind only
    let quote = record(DocumentKind::Quotation, "quo-1", "INV-1", "user-1", "draft", 2);
    store.insert(&quote).await.unwrap();
}

pub(crate) async fn id_is_unique_across_kinds(store: &dyn DocumentStore) {
    let inv = record(DocumentKind::Invoice, "doc-1", "INV-1", "user-1", "pending", 0);
    store.insert(&inv).await.unwrap();

    let quote = record(DocumentKind::Quotation, "doc-1", "QUO-1", "user-1", "draft", 1);
    let err = store.insert(&quote).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }), "got {err:?}");

    let err = store.update(&quote).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }), "got {err:?}");

    assert!(!store.remove(DocumentKind::Quotation, "doc-1").await.unwrap());
    assert_eq!(store.get(DocumentKind::Invoice, "doc-1").await.unwrap(), Some(inv));
}

pub(crate) async fn update_missing_is_not_found(store: &dyn DocumentStore) {
    let ghost = record(DocumentKind::Quotation, "quo-x", "QUO-X", "user-1", "sent", 0);
    let err = store.update(&ghost).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }), "got {err:?}");
}

pub(crate) async fn listing(store: &dyn DocumentStore) {
    let rows = [
        record(DocumentKind::Invoice, "a", "INV-A", "user-1", "paid", 0),
        record(DocumentKind::Invoice, "b", "INV-B", "user-1", "pending", 10),
        record(DocumentKind::Invoice, "c", "INV-C", "user-1", "paid", 20),
        record(DocumentKind::Invoice, "d", "INV-D", "user-2", "paid", 30),
        record(DocumentKind::Quotation, "e", "QUO-E", "user-1", "draft", 40),
    ];
    for row in &rows {
        store.insert(row).await.unwrap();
    }

    let mine = store
        .list_by_owner(DocumentKind::Invoice, "user-1")
        .await
        .unwrap();
    let ids: Vec<&str> = mine.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);

    let paid = store
        .list_by_status(DocumentKind::Invoice, "user-1", "paid")
        .await
        .unwrap();
    let ids: Vec<&str> = paid.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a"]);

    let quotes = store
        .list_by_owner(DocumentKind::Quotation, "user-1")
        .await
        .unwrap();
    assert_eq!(quotes.len(), 1);

    assert!(store
        .list_by_owner(DocumentKind::Invoice, "nobody")
        .await
        .unwrap()
        .is_empty());
}

pub(crate) async fn sequences(store: &dyn DocumentStore) {
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let next_day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

    assert_eq!(store.next_sequence(DocumentKind::Invoice, day).await.unwrap(), 1);
    assert_eq!(store.next_sequence(DocumentKind::Invoice, day).await.unwrap(), 2);
    assert_eq!(store.next_sequence(DocumentKind::Quotation, day).await.unwrap(), 1);
    assert_eq!(store.next_sequence(DocumentKind::Invoice, next_day).await.unwrap(), 1);
    assert_eq!(store.next_sequence(DocumentKind::Invoice, day).await.unwrap(), 3);
}

pub(crate) async fn conversion_commits_both(store: &dyn DocumentStore) {
    let quote = record(DocumentKind::Quotation, "quo-1", "QUO-1", "user-1", "accepted", 0);
    store.insert(&quote).await.unwrap();

    let mut converted = quote.clone();
    converted.status = "converted".to_string();
    let invoice = record(DocumentKind::Invoice, "inv-1", "INV-1", "user-1", "pending", 5);

    store.commit_conversion(&converted, &invoice).await.unwrap();

    let q = store.get(DocumentKind::Quotation, "quo-1").await.unwrap().unwrap();
    assert_eq!(q.status, "converted");
    let i = store.get(DocumentKind::Invoice, "inv-1").await.unwrap();
    assert_eq!(i, Some(invoice));
}

pub(crate) async fn conversion_is_all_or_nothing(store: &dyn DocumentStore) {
    let quote = record(DocumentKind::Quotation, "quo-1", "QUO-1", "user-1", "accepted", 0);
    let existing = record(DocumentKind::Invoice, "inv-0", "INV-1", "user-1", "paid", 1);
    store.insert(&quote).await.unwrap();
    store.insert(&existing).await.unwrap();

    let mut converted = quote.clone();
    converted.status = "converted".to_string();
    // reuses an existing invoice number, so the insert half must fail
    let invoice = record(DocumentKind::Invoice, "inv-1", "INV-1", "user-1", "pending", 5);

    let err = store.commit_conversion(&converted, &invoice).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }), "got {err:?}");

    let q = store.get(DocumentKind::Quotation, "quo-1").await.unwrap().unwrap();
    assert_eq!(q.status, "accepted");
    assert!(store.get(DocumentKind::Invoice, "inv-1").await.unwrap().is_none());
}
