//! # Document Service
//!
//! The workflow layer: every operation loads, checks ownership, prices,
//! applies the lifecycle rules and persists.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller (acting user)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load ──► ensure_owner ──► calculator / lifecycle ──► store write      │
//! │   │            │                    │                      │            │
//! │   ▼            ▼                    ▼                      ▼            │
//! │ NotFound   AccessDenied   Validation / IllegalTransition  Persistence  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service holds no locks and never retries. Concurrent writes to the
//! same document are last-write-wins.

use billbook_core::ledger::{self, DailyAmount, InvoiceSummary, Transaction};
use billbook_core::lifecycle::{
    apply_transition, convert_to_invoice, create_document, ensure_convertible, ensure_owner,
    is_past_due, revise_document,
};
use billbook_core::numbering::format_document_number;
use billbook_core::{
    Conversion, Document, DocumentCalculator, DocumentDraft, DocumentKind, DocumentStatus,
    Invoice, InvoiceStatus, PaymentRequest, Quotation, QuotationStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::repository::{DocumentRecord, DocumentStore};

/// Orchestrates invoices and quotations over an injected store.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    calculator: DocumentCalculator,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("calculator", &self.calculator)
            .finish_non_exhaustive()
    }
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>, calculator: DocumentCalculator) -> Self {
        DocumentService { store, calculator }
    }

    pub fn calculator(&self) -> &DocumentCalculator {
        &self.calculator
    }

    // =========================================================================
    // Invoices
    // =========================================================================

    /// Creates an invoice in `initial` (draft or pending) with a fresh
    /// `INV-` number.
    pub async fn create_invoice(
        &self,
        owner_id: &str,
        draft: DocumentDraft,
        initial: InvoiceStatus,
    ) -> ServiceResult<Invoice> {
        self.create(owner_id, draft, initial).await
    }

    pub async fn get_invoice(&self, acting_user: &str, id: &str) -> ServiceResult<Invoice> {
        self.load_owned(acting_user, id).await
    }

    pub async fn list_invoices(&self, owner_id: &str) -> ServiceResult<Vec<Invoice>> {
        self.list(owner_id).await
    }

    pub async fn list_invoices_by_status(
        &self,
        owner_id: &str,
        status: InvoiceStatus,
    ) -> ServiceResult<Vec<Invoice>> {
        let records = self
            .store
            .list_by_status(DocumentKind::Invoice, owner_id, status.as_str())
            .await?;
        decode_all(&records)
    }

    /// Replaces the editable content and re-prices.
    pub async fn update_invoice(
        &self,
        acting_user: &str,
        id: &str,
        draft: DocumentDraft,
    ) -> ServiceResult<Invoice> {
        self.update(acting_user, id, draft).await
    }

    /// Moves an invoice to `next`. Settling (`paid`) requires `payment`.
    pub async fn transition_invoice(
        &self,
        acting_user: &str,
        id: &str,
        next: InvoiceStatus,
        payment: Option<&PaymentRequest>,
    ) -> ServiceResult<Invoice> {
        self.transition(acting_user, id, next, payment).await
    }

    pub async fn delete_invoice(&self, acting_user: &str, id: &str) -> ServiceResult<()> {
        self.delete::<InvoiceStatus>(acting_user, id).await
    }

    /// Moves every open invoice of `owner_id` whose due date is before
    /// `today` to `overdue`. Returns the invoices that were flagged.
    pub async fn flag_overdue_invoices(
        &self,
        owner_id: &str,
        today: NaiveDate,
    ) -> ServiceResult<Vec<Invoice>> {
        let now = Utc::now();
        let mut flagged = Vec::new();

        for invoice in self.list_invoices(owner_id).await? {
            if !is_past_due(&invoice, today) {
                continue;
            }
            let overdue = apply_transition(&invoice, InvoiceStatus::Overdue, None, now)?;
            self.store.update(&DocumentRecord::from_document(&overdue)?).await?;
            flagged.push(overdue);
        }

        if !flagged.is_empty() {
            info!(owner_id = %owner_id, count = flagged.len(), %today, "Flagged overdue invoices");
        }
        Ok(flagged)
    }

    // =========================================================================
    // Quotations
    // =========================================================================

    /// Creates a draft quotation with a fresh `QUO-` number.
    pub async fn create_quotation(
        &self,
        owner_id: &str,
        draft: DocumentDraft,
    ) -> ServiceResult<Quotation> {
        self.create(owner_id, draft, QuotationStatus::Draft).await
    }

    pub async fn get_quotation(&self, acting_user: &str, id: &str) -> ServiceResult<Quotation> {
        self.load_owned(acting_user, id).await
    }

    pub async fn list_quotations(&self, owner_id: &str) -> ServiceResult<Vec<Quotation>> {
        self.list(owner_id).await
    }

    pub async fn update_quotation(
        &self,
        acting_user: &str,
        id: &str,
        draft: DocumentDraft,
    ) -> ServiceResult<Quotation> {
        self.update(acting_user, id, draft).await
    }

    /// Moves a quotation to `next`. `converted` goes through
    /// [`DocumentService::convert_quotation`] and returns the converted
    /// quotation.
    pub async fn transition_quotation(
        &self,
        acting_user: &str,
        id: &str,
        next: QuotationStatus,
    ) -> ServiceResult<Quotation> {
        if next == QuotationStatus::Converted {
            return Ok(self.convert_quotation(acting_user, id).await?.quotation);
        }
        self.transition(acting_user, id, next, None).await
    }

    /// Converts an accepted quotation into a pending invoice. The quotation
    /// update and the invoice insert are committed together.
    pub async fn convert_quotation(
        &self,
        acting_user: &str,
        id: &str,
    ) -> ServiceResult<Conversion> {
        let quotation: Quotation = self.load_owned(acting_user, id).await?;
        let now = Utc::now();

        // Fail on status before spending an invoice number.
        if let Err(err) = ensure_convertible(&quotation) {
            warn!(quotation_id = %id, status = %quotation.status, "Rejected conversion");
            return Err(err.into());
        }

        let number = self.allocate_number(DocumentKind::Invoice, now).await?;
        let conversion = convert_to_invoice(&quotation, Uuid::new_v4().to_string(), number, now)?;

        self.store
            .commit_conversion(
                &DocumentRecord::from_document(&conversion.quotation)?,
                &DocumentRecord::from_document(&conversion.invoice)?,
            )
            .await?;

        info!(
            quotation_id = %conversion.quotation.id,
            invoice_id = %conversion.invoice.id,
            invoice_number = %conversion.invoice.number,
            "Converted quotation to invoice"
        );
        Ok(conversion)
    }

    pub async fn delete_quotation(&self, acting_user: &str, id: &str) -> ServiceResult<()> {
        self.delete::<QuotationStatus>(acting_user, id).await
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// One credit transaction per paid invoice, newest first.
    pub async fn transactions(&self, owner_id: &str) -> ServiceResult<Vec<Transaction>> {
        Ok(ledger::transactions_from_invoices(&self.list_invoices(owner_id).await?))
    }

    pub async fn daily_amounts(&self, owner_id: &str) -> ServiceResult<Vec<DailyAmount>> {
        Ok(ledger::daily_amounts(&self.list_invoices(owner_id).await?))
    }

    pub async fn summary(&self, owner_id: &str) -> ServiceResult<InvoiceSummary> {
        Ok(ledger::summarize(&self.list_invoices(owner_id).await?))
    }

    // =========================================================================
    // Shared workflow
    // =========================================================================

    async fn allocate_number(
        &self,
        kind: DocumentKind,
        now: DateTime<Utc>,
    ) -> ServiceResult<String> {
        let date = now.date_naive();
        let sequence = self.store.next_sequence(kind, date).await?;
        Ok(format_document_number(kind, date, sequence))
    }

    async fn create<S>(
        &self,
        owner_id: &str,
        draft: DocumentDraft,
        initial: S,
    ) -> ServiceResult<Document<S>>
    where
        S: DocumentStatus + Serialize + DeserializeOwned,
    {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        // Price and validate first so rejected drafts don't consume a number.
        let mut doc = create_document(
            id,
            String::new(),
            owner_id,
            draft,
            initial,
            &self.calculator,
            now,
        )?;
        doc.number = self.allocate_number(S::KIND, now).await?;

        self.store.insert(&DocumentRecord::from_document(&doc)?).await?;

        info!(
            kind = %S::KIND,
            id = %doc.id,
            number = %doc.number,
            status = %doc.status,
            total = %doc.total(),
            "Created document"
        );
        Ok(doc)
    }

    async fn load<S>(&self, id: &str) -> ServiceResult<Document<S>>
    where
        S: DocumentStatus + DeserializeOwned,
    {
        debug!(kind = %S::KIND, id = %id, "Loading document");
        let record = self
            .store
            .get(S::KIND, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(S::KIND, id))?;
        Ok(record.to_document()?)
    }

    async fn load_owned<S>(&self, acting_user: &str, id: &str) -> ServiceResult<Document<S>>
    where
        S: DocumentStatus + DeserializeOwned,
    {
        let doc: Document<S> = self.load(id).await?;
        if let Err(err) = ensure_owner(&doc, acting_user) {
            warn!(kind = %S::KIND, id = %id, acting_user = %acting_user, "Access denied");
            return Err(err.into());
        }
        Ok(doc)
    }

    async fn list<S>(&self, owner_id: &str) -> ServiceResult<Vec<Document<S>>>
    where
        S: DocumentStatus + DeserializeOwned,
    {
        let records = self.store.list_by_owner(S::KIND, owner_id).await?;
        decode_all(&records)
    }

    async fn update<S>(
        &self,
        acting_user: &str,
        id: &str,
        draft: DocumentDraft,
    ) -> ServiceResult<Document<S>>
    where
        S: DocumentStatus + Serialize + DeserializeOwned,
    {
        let doc: Document<S> = self.load_owned(acting_user, id).await?;
        let revised = revise_document(&doc, draft, &self.calculator, Utc::now())?;

        self.store.update(&DocumentRecord::from_document(&revised)?).await?;

        info!(kind = %S::KIND, id = %id, total = %revised.total(), "Updated document");
        Ok(revised)
    }

    async fn transition<S>(
        &self,
        acting_user: &str,
        id: &str,
        next: S,
        payment: Option<&PaymentRequest>,
    ) -> ServiceResult<Document<S>>
    where
        S: DocumentStatus + Serialize + DeserializeOwned,
    {
        let doc: Document<S> = self.load_owned(acting_user, id).await?;

        let updated = apply_transition(&doc, next, payment, Utc::now()).map_err(|err| {
            warn!(
                kind = %S::KIND,
                id = %id,
                from = %doc.status,
                to = %next,
                error = %err,
                "Rejected transition"
            );
            err
        })?;

        self.store.update(&DocumentRecord::from_document(&updated)?).await?;

        info!(kind = %S::KIND, id = %id, from = %doc.status, to = %next, "Document transitioned");
        Ok(updated)
    }

    async fn delete<S>(&self, acting_user: &str, id: &str) -> ServiceResult<()>
    where
        S: DocumentStatus + DeserializeOwned,
    {
        let doc: Document<S> = self.load_owned(acting_user, id).await?;
        if !self.store.remove(S::KIND, id).await? {
            return Err(ServiceError::not_found(S::KIND, id));
        }
        info!(kind = %S::KIND, id = %id, number = %doc.number, "Deleted document");
        Ok(())
    }
}

fn decode_all<S>(records: &[DocumentRecord]) -> ServiceResult<Vec<Document<S>>>
where
    S: DocumentStatus + DeserializeOwned,
{
    records
        .iter()
        .map(|record| record.to_document().map_err(ServiceError::from))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::InMemoryDocumentStore;
    use billbook_core::{
        CoreError, LineItem, Money, Party, PaymentMode, PaymentRecord, Rate, TaxBreakdown,
        ValidationError,
    };
    use chrono::Duration;

    fn service() -> DocumentService {
        DocumentService::new(Arc::new(InMemoryDocumentStore::new()), DocumentCalculator::default())
    }

    async fn sqlite_service() -> DocumentService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DocumentService::new(Arc::new(db.documents()), DocumentCalculator::default())
    }

    /// 2 × ₹1,500 at 18% IGST: crosses the ₹1,000 band.
    fn draft() -> DocumentDraft {
        DocumentDraft {
            client: Party::new("Acme Traders", "accounts@acme.in"),
            issuer: Party::new("Billbook Studio", "billing@studio.in"),
            items: vec![LineItem::new(
                "li-1",
                "Design retainer",
                2,
                Money::from_major_minor(1500, 0),
            )],
            taxes: TaxBreakdown::interstate(Rate::from_bps(1800)),
            ..Default::default()
        }
    }

    fn upi_payment() -> PaymentRequest {
        PaymentRequest::new(PaymentMode::Upi).with_upi_id("acme.accounts@okbank")
    }

    fn core_err(err: ServiceError) -> CoreError {
        match err {
            ServiceError::Core(core) => core,
            other => panic!("expected a core error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_invoice_numbers_and_prices() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();

        assert!(invoice.number.starts_with("INV-"));
        assert!(invoice.number.ends_with("-0001"));
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.totals.subtotal, Money::from_major_minor(3000, 0));
        assert_eq!(invoice.totals.discount_rate, Rate::from_bps(500));

        let second = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Draft)
            .await
            .unwrap();
        assert!(second.number.ends_with("-0002"));

        let loaded = svc.get_invoice("user-1", &invoice.id).await.unwrap();
        assert_eq!(loaded, invoice);
    }

    #[tokio::test]
    async fn test_rejected_draft_spends_no_number() {
        let svc = service();
        let mut bad = draft();
        bad.items.clear();

        let err = core_err(svc.create_invoice("user-1", bad, InvoiceStatus::Draft).await.unwrap_err());
        assert!(err.is_validation());

        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Draft)
            .await
            .unwrap();
        assert!(invoice.number.ends_with("-0001"));
    }

    #[tokio::test]
    async fn test_invoice_cannot_start_paid() {
        let svc = service();
        let err = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(
            core_err(err),
            CoreError::Validation(ValidationError::NotAllowed { .. })
        ));
    }

    #[tokio::test]
    async fn test_quotation_numbers_are_separate() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Draft)
            .await
            .unwrap();
        let quotation = svc.create_quotation("user-1", draft()).await.unwrap();

        assert!(quotation.number.starts_with("QUO-"));
        assert!(quotation.number.ends_with("-0001"));
        assert_eq!(quotation.status, QuotationStatus::Draft);
        assert_ne!(quotation.number, invoice.number);
    }

    #[tokio::test]
    async fn test_other_owner_is_denied_everywhere() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();
        let quotation = svc.create_quotation("user-1", draft()).await.unwrap();

        assert!(svc.get_invoice("user-2", &invoice.id).await.unwrap_err().is_access_denied());
        assert!(svc
            .update_invoice("user-2", &invoice.id, draft())
            .await
            .unwrap_err()
            .is_access_denied());
        assert!(svc
            .transition_invoice("user-2", &invoice.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap_err()
            .is_access_denied());
        assert!(svc.delete_invoice("user-2", &invoice.id).await.unwrap_err().is_access_denied());

        assert!(svc.get_quotation("user-2", &quotation.id).await.unwrap_err().is_access_denied());
        assert!(svc
            .transition_quotation("user-2", &quotation.id, QuotationStatus::Sent)
            .await
            .unwrap_err()
            .is_access_denied());
        assert!(svc
            .convert_quotation("user-2", &quotation.id)
            .await
            .unwrap_err()
            .is_access_denied());
        assert!(svc
            .delete_quotation("user-2", &quotation.id)
            .await
            .unwrap_err()
            .is_access_denied());

        // nothing changed for the owner
        let still = svc.get_invoice("user-1", &invoice.id).await.unwrap();
        assert_eq!(still.status, InvoiceStatus::Pending);
        assert!(svc.list_invoices("user-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_document() {
        let svc = service();
        let err = svc.get_invoice("user-1", "nope").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: DocumentKind::Invoice,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_reprices() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Draft)
            .await
            .unwrap();

        let mut bigger = draft();
        bigger.items[0].set_quantity(4);
        let updated = svc.update_invoice("user-1", &invoice.id, bigger).await.unwrap();

        assert_eq!(updated.number, invoice.number);
        assert_eq!(updated.totals.subtotal, Money::from_major_minor(6000, 0));
        assert_eq!(updated.totals.discount_rate, Rate::from_bps(1000));
    }

    #[tokio::test]
    async fn test_paid_invoice_is_not_editable() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();
        svc.transition_invoice("user-1", &invoice.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap();

        let err = svc.update_invoice("user-1", &invoice.id, draft()).await.unwrap_err();
        assert!(matches!(core_err(err), CoreError::NotEditable { .. }));
    }

    #[tokio::test]
    async fn test_settling_requires_valid_payment() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();

        let err = svc
            .transition_invoice("user-1", &invoice.id, InvoiceStatus::Paid, None)
            .await
            .unwrap_err();
        assert!(matches!(
            core_err(err),
            CoreError::Validation(ValidationError::Required { ref field }) if field == "paymentMode"
        ));

        let cash_with_ref = PaymentRequest::new(PaymentMode::Cash).with_transaction_id("123456");
        let err = svc
            .transition_invoice("user-1", &invoice.id, InvoiceStatus::Paid, Some(&cash_with_ref))
            .await
            .unwrap_err();
        assert!(matches!(
            core_err(err),
            CoreError::Validation(ValidationError::Forbidden { .. })
        ));

        // rejected attempts leave the invoice untouched
        let unchanged = svc.get_invoice("user-1", &invoice.id).await.unwrap();
        assert_eq!(unchanged.status, InvoiceStatus::Pending);
        assert!(unchanged.payment.is_none());

        let paid = svc
            .transition_invoice("user-1", &invoice.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(
            paid.payment,
            Some(PaymentRecord::Upi {
                upi_id: "acme.accounts@okbank".to_string(),
                transaction_id: None,
            })
        );

        let err = svc
            .transition_invoice("user-1", &invoice.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap_err();
        assert!(matches!(core_err(err), CoreError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_quotation_accept_and_convert() {
        let svc = service();
        let quotation = svc.create_quotation("user-1", draft()).await.unwrap();

        // draft quotations cannot be converted
        let err = svc.convert_quotation("user-1", &quotation.id).await.unwrap_err();
        assert!(matches!(core_err(err), CoreError::IllegalTransition { .. }));

        svc.transition_quotation("user-1", &quotation.id, QuotationStatus::Sent)
            .await
            .unwrap();
        svc.transition_quotation("user-1", &quotation.id, QuotationStatus::Accepted)
            .await
            .unwrap();

        let Conversion { quotation: q, invoice } =
            svc.convert_quotation("user-1", &quotation.id).await.unwrap();

        assert_eq!(q.status, QuotationStatus::Converted);
        assert_eq!(q.linked_document_id.as_deref(), Some(invoice.id.as_str()));
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.linked_document_id.as_deref(), Some(quotation.id.as_str()));
        assert_eq!(invoice.totals, quotation.totals);
        assert!(invoice.number.starts_with("INV-"));
        assert_ne!(invoice.number, quotation.number);

        let stored = svc.get_invoice("user-1", &invoice.id).await.unwrap();
        assert_eq!(stored, invoice);
        let stored = svc.get_quotation("user-1", &quotation.id).await.unwrap();
        assert_eq!(stored.status, QuotationStatus::Converted);

        let err = svc.convert_quotation("user-1", &quotation.id).await.unwrap_err();
        assert!(matches!(core_err(err), CoreError::IllegalTransition { .. }));
        assert_eq!(svc.list_invoices("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transition_to_converted_routes_to_conversion() {
        let svc = service();
        let quotation = svc.create_quotation("user-1", draft()).await.unwrap();
        for next in [QuotationStatus::Sent, QuotationStatus::Accepted] {
            svc.transition_quotation("user-1", &quotation.id, next).await.unwrap();
        }

        let converted = svc
            .transition_quotation("user-1", &quotation.id, QuotationStatus::Converted)
            .await
            .unwrap();

        assert_eq!(converted.status, QuotationStatus::Converted);
        let invoices = svc.list_invoices("user-1").await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(converted.linked_document_id.as_deref(), Some(invoices[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_rejected_quotation_is_final() {
        let svc = service();
        let quotation = svc.create_quotation("user-1", draft()).await.unwrap();
        svc.transition_quotation("user-1", &quotation.id, QuotationStatus::Sent)
            .await
            .unwrap();
        svc.transition_quotation("user-1", &quotation.id, QuotationStatus::Rejected)
            .await
            .unwrap();

        let err = svc
            .transition_quotation("user-1", &quotation.id, QuotationStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(core_err(err), CoreError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_flag_overdue_only_touches_past_due_open_invoices() {
        let svc = service();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let mut late = draft();
        late.due_date = Some(today - Duration::days(3));
        let mut future = draft();
        future.due_date = Some(today + Duration::days(3));

        let late_open = svc
            .create_invoice("user-1", late.clone(), InvoiceStatus::Pending)
            .await
            .unwrap();
        let not_due = svc
            .create_invoice("user-1", future, InvoiceStatus::Pending)
            .await
            .unwrap();
        let late_paid = svc
            .create_invoice("user-1", late.clone(), InvoiceStatus::Pending)
            .await
            .unwrap();
        svc.transition_invoice("user-1", &late_paid.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap();
        let other_owner = svc
            .create_invoice("user-2", late, InvoiceStatus::Pending)
            .await
            .unwrap();

        let flagged = svc.flag_overdue_invoices("user-1", today).await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, late_open.id);
        assert_eq!(flagged[0].status, InvoiceStatus::Overdue);

        let overdue = svc
            .list_invoices_by_status("user-1", InvoiceStatus::Overdue)
            .await
            .unwrap();
        assert_eq!(overdue.len(), 1);

        assert_eq!(
            svc.get_invoice("user-1", &not_due.id).await.unwrap().status,
            InvoiceStatus::Pending
        );
        assert_eq!(
            svc.get_invoice("user-1", &late_paid.id).await.unwrap().status,
            InvoiceStatus::Paid
        );
        assert_eq!(
            svc.get_invoice("user-2", &other_owner.id).await.unwrap().status,
            InvoiceStatus::Pending
        );

        // running again finds nothing new
        assert!(svc.flag_overdue_invoices("user-1", today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let svc = service();
        let invoice = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();

        svc.delete_invoice("user-1", &invoice.id).await.unwrap();
        assert!(matches!(
            svc.get_invoice("user-1", &invoice.id).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
        assert!(matches!(
            svc.delete_invoice("user-1", &invoice.id).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_ledger_views() {
        let svc = service();
        let paid = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();
        let open = svc
            .create_invoice("user-1", draft(), InvoiceStatus::Pending)
            .await
            .unwrap();
        svc.create_invoice("user-1", draft(), InvoiceStatus::Draft)
            .await
            .unwrap();
        svc.transition_invoice("user-1", &paid.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap();

        let txns = svc.transactions("user-1").await.unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].invoice_id, paid.id);
        assert_eq!(txns[0].amount, paid.total());

        let summary = svc.summary("user-1").await.unwrap();
        assert_eq!(summary.received, paid.total());
        assert_eq!(summary.outstanding, open.total());
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.draft_count, 1);
        assert_eq!(summary.total_count(), 3);

        let daily = svc.daily_amounts("user-1").await.unwrap();
        let received: i64 = daily.iter().map(|d| d.received.minor()).sum();
        let due: i64 = daily.iter().map(|d| d.due.minor()).sum();
        assert_eq!(received, paid.total().minor());
        assert_eq!(due, open.total().minor());

        assert!(svc.transactions("user-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conversion_on_sqlite() {
        let svc = sqlite_service().await;
        let quotation = svc.create_quotation("user-1", draft()).await.unwrap();
        for next in [QuotationStatus::Sent, QuotationStatus::Accepted] {
            svc.transition_quotation("user-1", &quotation.id, next).await.unwrap();
        }

        let conversion = svc.convert_quotation("user-1", &quotation.id).await.unwrap();
        let invoice = svc.get_invoice("user-1", &conversion.invoice.id).await.unwrap();
        assert_eq!(invoice, conversion.invoice);

        let paid = svc
            .transition_invoice("user-1", &invoice.id, InvoiceStatus::Paid, Some(&upi_payment()))
            .await
            .unwrap();
        assert_eq!(svc.summary("user-1").await.unwrap().received, paid.total());
    }
}
