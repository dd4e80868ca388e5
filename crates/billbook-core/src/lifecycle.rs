//! # Document Lifecycle
//!
//! Status state machines for invoices and quotations, settlement checks, and
//! quotation → invoice conversion.
//!
//! ## Invoice
//! ```text
//!   from        │ may move to
//!   ────────────┼──────────────────────────────────
//!   draft       │ pending, confirmed, paid, overdue
//!   pending     │ paid, overdue
//!   confirmed   │ pending, paid, overdue
//!   overdue     │ paid
//!   paid        │ (terminal)
//! ```
//! Entering `paid` requires validated payment details.
//!
//! ## Quotation
//! ```text
//!   draft ──► sent ──┬──► accepted ──► converted  (terminal)
//!                    └──► rejected                (terminal)
//! ```
//!
//! Every function here is a pure transform: nothing is persisted, and a
//! failed check leaves the input untouched.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use crate::calculator::DocumentCalculator;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{
    Document, DocumentDraft, DocumentKind, Invoice, InvoiceStatus, PaymentRecord,
    PaymentRequest, Quotation, QuotationStatus,
};
use crate::validation::{validate_draft, validate_settlement};

// =============================================================================
// Status Trait
// =============================================================================

/// A status vocabulary with its transition graph.
pub trait DocumentStatus:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = ValidationError> + Send + Sync + 'static
{
    const KIND: DocumentKind;

    fn name(&self) -> &'static str;

    /// Statuses directly reachable from this one.
    fn successors(&self) -> &'static [Self];

    /// Statuses a new document may start in.
    fn initial_statuses() -> &'static [Self];

    fn can_transition_to(&self, next: Self) -> bool {
        self.successors().contains(&next)
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    fn is_initial(&self) -> bool {
        Self::initial_statuses().contains(self)
    }

    /// Entering this status settles the document and needs payment details.
    fn requires_payment(&self) -> bool {
        false
    }

    fn is_editable(&self) -> bool {
        !self.is_terminal()
    }
}

impl DocumentStatus for InvoiceStatus {
    const KIND: DocumentKind = DocumentKind::Invoice;

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn successors(&self) -> &'static [Self] {
        use InvoiceStatus::*;
        match self {
            Draft => &[Pending, Confirmed, Paid, Overdue],
            Pending => &[Paid, Overdue],
            Confirmed => &[Pending, Paid, Overdue],
            Overdue => &[Paid],
            Paid => &[],
        }
    }

    fn initial_statuses() -> &'static [Self] {
        &[InvoiceStatus::Draft, InvoiceStatus::Pending]
    }

    fn requires_payment(&self) -> bool {
        *self == InvoiceStatus::Paid
    }
}

impl DocumentStatus for QuotationStatus {
    const KIND: DocumentKind = DocumentKind::Quotation;

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn successors(&self) -> &'static [Self] {
        use QuotationStatus::*;
        match self {
            Draft => &[Sent],
            Sent => &[Accepted, Rejected],
            Accepted => &[Converted],
            Rejected | Converted => &[],
        }
    }

    fn initial_statuses() -> &'static [Self] {
        &[QuotationStatus::Draft]
    }
}

fn illegal<S: DocumentStatus>(from: S, to: S) -> CoreError {
    CoreError::IllegalTransition {
        kind: S::KIND.as_str(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

// =============================================================================
// Creation and Editing
// =============================================================================

/// Prices a validated draft into a new document.
///
/// ## Errors
/// - `Validation` when the draft fails a form rule or a rate is out of range
/// - `Validation(NotAllowed)` when `initial` is not a valid starting status
pub fn create_document<S: DocumentStatus>(
    id: impl Into<String>,
    number: impl Into<String>,
    owner_id: impl Into<String>,
    draft: DocumentDraft,
    initial: S,
    calculator: &DocumentCalculator,
    now: DateTime<Utc>,
) -> CoreResult<Document<S>> {
    if !initial.is_initial() {
        return Err(ValidationError::NotAllowed {
            field: "status".to_string(),
            allowed: S::initial_statuses().iter().map(|s| s.to_string()).collect(),
        }
        .into());
    }
    validate_draft(&draft)?;
    let totals = calculator.compute_totals(&draft.items, &draft.taxes, draft.discount_rate)?;

    Ok(Document {
        id: id.into(),
        number: number.into(),
        owner_id: owner_id.into(),
        client: draft.client,
        issuer: draft.issuer,
        items: draft.items,
        taxes: draft.taxes,
        totals,
        notes: draft.notes,
        status: initial,
        payment: None,
        due_date: draft.due_date,
        linked_document_id: None,
        created_at: now,
        updated_at: now,
    })
}

/// Refuses edits once a document is in a terminal status.
pub fn ensure_editable<S: DocumentStatus>(doc: &Document<S>) -> CoreResult<()> {
    if doc.status.is_editable() {
        Ok(())
    } else {
        Err(CoreError::NotEditable {
            kind: S::KIND.as_str(),
            status: doc.status.to_string(),
        })
    }
}

/// Replaces the editable content of a document and re-prices it.
///
/// Identity, number, owner, status and payment are kept.
pub fn revise_document<S: DocumentStatus>(
    doc: &Document<S>,
    draft: DocumentDraft,
    calculator: &DocumentCalculator,
    now: DateTime<Utc>,
) -> CoreResult<Document<S>> {
    ensure_editable(doc)?;
    validate_draft(&draft)?;
    let totals = calculator.compute_totals(&draft.items, &draft.taxes, draft.discount_rate)?;

    Ok(Document {
        client: draft.client,
        issuer: draft.issuer,
        items: draft.items,
        taxes: draft.taxes,
        totals,
        notes: draft.notes,
        due_date: draft.due_date,
        updated_at: now,
        ..doc.clone()
    })
}

/// The acting user must be the document's owner.
pub fn ensure_owner<S>(doc: &Document<S>, acting_user: &str) -> CoreResult<()> {
    if doc.is_owned_by(acting_user) {
        Ok(())
    } else {
        Err(CoreError::AccessDenied {
            document_id: doc.id.clone(),
        })
    }
}

// =============================================================================
// Transitions
// =============================================================================

fn check_transition<S: DocumentStatus>(
    doc: &Document<S>,
    next: S,
    payment: Option<&PaymentRequest>,
) -> CoreResult<Option<PaymentRecord>> {
    if !doc.status.can_transition_to(next) {
        return Err(illegal(doc.status, next));
    }

    let payment = payment.filter(|p| !p.is_blank());

    if next.requires_payment() {
        let request = payment.ok_or_else(|| ValidationError::Required {
            field: "paymentMode".to_string(),
        })?;
        let record = validate_settlement(request, &doc.client, &doc.issuer)?;
        return Ok(Some(record));
    }

    if payment.is_some() {
        return Err(ValidationError::Forbidden {
            field: "paymentMode".to_string(),
            reason: format!("payment details are only accepted when settling, not for {next}"),
        }
        .into());
    }
    Ok(None)
}

/// Checks whether `doc` may move to `next`.
///
/// ## Rules (first failure wins)
/// 1. `next` must be reachable from the current status
/// 2. entering `paid` needs payment details passing [`validate_settlement`]
/// 3. any other transition must not carry payment details
pub fn can_transition<S: DocumentStatus>(
    doc: &Document<S>,
    next: S,
    payment: Option<&PaymentRequest>,
) -> CoreResult<()> {
    check_transition(doc, next, payment).map(|_| ())
}

/// Returns `doc` moved to `next`, with `updated_at = now` and the validated
/// payment record attached when settling.
///
/// Quotations should reach `converted` through [`convert_to_invoice`], which
/// also produces the invoice and the links between the two.
///
/// ## Example
/// ```rust
/// use billbook_core::calculator::DocumentCalculator;
/// use billbook_core::lifecycle::{apply_transition, create_document};
/// use billbook_core::money::Money;
/// use billbook_core::types::*;
/// use chrono::Utc;
///
/// let draft = DocumentDraft {
///     client: Party::new("Acme", "a@acme.in"),
///     items: vec![LineItem::new("li-1", "Audit", 1, Money::from_minor(10_000))],
///     ..Default::default()
/// };
/// let now = Utc::now();
/// let invoice: Invoice = create_document(
///     "inv-1", "INV-20261016-0001", "user-1", draft,
///     InvoiceStatus::Draft, &DocumentCalculator::default(), now,
/// ).unwrap();
///
/// let payment = PaymentRequest::new(PaymentMode::Cash);
/// let paid = apply_transition(&invoice, InvoiceStatus::Paid, Some(&payment), now).unwrap();
/// assert_eq!(paid.status, InvoiceStatus::Paid);
/// ```
pub fn apply_transition<S: DocumentStatus>(
    doc: &Document<S>,
    next: S,
    payment: Option<&PaymentRequest>,
    now: DateTime<Utc>,
) -> CoreResult<Document<S>> {
    let record = check_transition(doc, next, payment)?;

    let mut updated = doc.clone();
    updated.status = next;
    updated.updated_at = now;
    if record.is_some() {
        updated.payment = record;
    }
    Ok(updated)
}

/// An open invoice whose due date has passed and that can still be flagged.
pub fn is_past_due(invoice: &Invoice, today: NaiveDate) -> bool {
    match invoice.due_date {
        Some(due) => due < today && invoice.status.can_transition_to(InvoiceStatus::Overdue),
        None => false,
    }
}

// =============================================================================
// Conversion
// =============================================================================

/// Result of converting an accepted quotation.
///
/// Both halves must be persisted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub quotation: Quotation,
    pub invoice: Invoice,
}

/// Only accepted quotations can be converted.
pub fn ensure_convertible(quotation: &Quotation) -> CoreResult<()> {
    if quotation.status.can_transition_to(QuotationStatus::Converted) {
        Ok(())
    } else {
        Err(illegal(quotation.status, QuotationStatus::Converted))
    }
}

/// Turns an accepted quotation into a pending invoice.
///
/// The invoice copies parties, items, taxes, totals, notes and due date,
/// and links back to the quotation. The quotation becomes `converted` and
/// links forward to the invoice.
///
/// ## Errors
/// - `IllegalTransition` unless the quotation is `accepted`
/// - `DuplicateNumber` if `invoice_number` equals the quotation's number
pub fn convert_to_invoice(
    quotation: &Quotation,
    invoice_id: impl Into<String>,
    invoice_number: impl Into<String>,
    now: DateTime<Utc>,
) -> CoreResult<Conversion> {
    ensure_convertible(quotation)?;

    let invoice_id = invoice_id.into();
    let invoice_number = invoice_number.into();
    if invoice_number == quotation.number {
        return Err(CoreError::DuplicateNumber(invoice_number));
    }

    let invoice = Invoice {
        id: invoice_id.clone(),
        number: invoice_number,
        owner_id: quotation.owner_id.clone(),
        client: quotation.client.clone(),
        issuer: quotation.issuer.clone(),
        items: quotation.items.clone(),
        taxes: quotation.taxes,
        totals: quotation.totals,
        notes: quotation.notes.clone(),
        status: InvoiceStatus::Pending,
        payment: None,
        due_date: quotation.due_date,
        linked_document_id: Some(quotation.id.clone()),
        created_at: now,
        updated_at: now,
    };

    let mut converted = quotation.clone();
    converted.status = QuotationStatus::Converted;
    converted.linked_document_id = Some(invoice_id);
    converted.updated_at = now;

    Ok(Conversion {
        quotation: converted,
        invoice,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
