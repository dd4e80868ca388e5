//! # Ledger
//!
//! Read-only views derived from invoices: the payments ledger, the daily
//! received/due series for the dashboard chart, and headline totals.
//!
//! ```text
//! invoices ──┬──► transactions_from_invoices ──► filter / sort ──► Payments page
//!            ├──► daily_amounts ──────────────────────────────────► Dashboard chart
//!            └──► summarize ──────────────────────────────────────► Dashboard cards
//! ```
//!
//! Nothing here is stored; every view is recomputed from the invoices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Invoice, InvoiceStatus};

// =============================================================================
// Transactions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransactionKind {
    Credit,
}

/// One ledger row: a paid invoice seen as money received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub invoice_id: String,
    pub invoice_number: String,
    pub client_name: String,
    pub amount: Money,
    pub kind: TransactionKind,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One credit transaction per paid invoice, newest first.
///
/// The transaction date is the invoice's last update, which for a paid
/// invoice is the moment it was settled.
pub fn transactions_from_invoices(invoices: &[Invoice]) -> Vec<Transaction> {
    let mut txns: Vec<Transaction> = invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid)
        .map(|invoice| Transaction {
            id: invoice.id.clone(),
            invoice_id: invoice.id.clone(),
            invoice_number: invoice.number.clone(),
            client_name: invoice.client.name.clone(),
            amount: invoice.totals.total,
            kind: TransactionKind::Credit,
            date: invoice.updated_at,
            status: invoice.status,
        })
        .collect();
    txns.sort_by(|a, b| b.date.cmp(&a.date));
    txns
}

/// Case-insensitive substring match on the invoice number. An empty term
/// keeps everything.
pub fn filter_by_invoice_number(txns: &[Transaction], term: &str) -> Vec<Transaction> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return txns.to_vec();
    }
    txns.iter()
        .filter(|t| t.invoice_number.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

pub fn sort_by_amount(txns: &[Transaction], direction: SortDirection) -> Vec<Transaction> {
    let mut sorted = txns.to_vec();
    match direction {
        SortDirection::Asc => sorted.sort_by(|a, b| a.amount.cmp(&b.amount)),
        SortDirection::Desc => sorted.sort_by(|a, b| b.amount.cmp(&a.amount)),
    }
    sorted
}

pub fn sort_by_date(txns: &[Transaction], direction: SortDirection) -> Vec<Transaction> {
    let mut sorted = txns.to_vec();
    match direction {
        SortDirection::Asc => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
        SortDirection::Desc => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
    }
    sorted
}

// =============================================================================
// Dashboard
// =============================================================================

/// Received and due totals for invoices created on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyAmount {
    /// Short weekday label for the chart axis ("Mon", "Tue", ...).
    pub day: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub received: Money,
    pub due: Money,
}

/// Groups invoices by creation day (UTC), ascending.
///
/// Paid invoices count as received; pending and overdue as due. Drafts and
/// confirmed invoices still get a row for their day but add nothing.
pub fn daily_amounts(invoices: &[Invoice]) -> Vec<DailyAmount> {
    let mut days: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();

    for invoice in invoices {
        let entry = days
            .entry(invoice.created_at.date_naive())
            .or_insert((Money::zero(), Money::zero()));
        match invoice.status {
            InvoiceStatus::Paid => entry.0 += invoice.totals.total,
            InvoiceStatus::Pending | InvoiceStatus::Overdue => entry.1 += invoice.totals.total,
            InvoiceStatus::Draft | InvoiceStatus::Confirmed => {}
        }
    }

    days.into_iter()
        .map(|(date, (received, due))| DailyAmount {
            day: date.format("%a").to_string(),
            date,
            received,
            due,
        })
        .collect()
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceSummary {
    pub received: Money,
    /// Pending + overdue.
    pub outstanding: Money,
    pub overdue: Money,
    pub draft_count: usize,
    pub pending_count: usize,
    pub confirmed_count: usize,
    pub paid_count: usize,
    pub overdue_count: usize,
}

impl InvoiceSummary {
    pub fn total_count(&self) -> usize {
        self.draft_count
            + self.pending_count
            + self.confirmed_count
            + self.paid_count
            + self.overdue_count
    }
}

pub fn summarize(invoices: &[Invoice]) -> InvoiceSummary {
    invoices
        .iter()
        .fold(InvoiceSummary::default(), |mut summary, invoice| {
            let total = invoice.totals.total;
            match invoice.status {
                InvoiceStatus::Draft => summary.draft_count += 1,
                InvoiceStatus::Confirmed => summary.confirmed_count += 1,
                InvoiceStatus::Pending => {
                    summary.pending_count += 1;
                    summary.outstanding += total;
                }
                InvoiceStatus::Overdue => {
                    summary.overdue_count += 1;
                    summary.outstanding += total;
                    summary.overdue += total;
                }
                InvoiceStatus::Paid => {
                    summary.paid_count += 1;
                    summary.received += total;
                }
            }
            summary
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
