//! # Domain Types
//!
//! Core domain types shared by invoices and quotations.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Document<S>   │   │    LineItem     │   │  TaxBreakdown   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id / number    │   │  quantity       │   │  igst (Rate)    │       │
//! │  │  owner_id       │   │  unit_price     │   │  cgst (Rate)    │       │
//! │  │  items, totals  │   │  amount (derived│   │  sgst (Rate)    │       │
//! │  │  status: S      │   │   never edited) │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InvoiceStatus  │   │ QuotationStatus │   │  PaymentRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Draft          │   │  Draft          │   │  BankTransfer   │       │
//! │  │  Pending        │   │  Sent           │   │  Upi            │       │
//! │  │  Confirmed      │   │  Accepted       │   │  Cash           │       │
//! │  │  Paid           │   │  Rejected       │   │  Card           │       │
//! │  │  Overdue        │   │  Converted      │   │  Cheque         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoice and Quotation are the same `Document<S>` shape; only the status
//! vocabulary differs. The state machines live in [`crate::lifecycle`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 bps = 0.01%, so `1800` is 18% IGST and `250` is 2.5% CGST.
/// Used for the three tax components and for the discount rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// 100% in basis points. Rates above this are rejected by the calculator.
    pub const MAX_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage as typed in a form (`18.0`, `2.5`).
    ///
    /// Negative input saturates to zero.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True when the rate lies within 0–100%.
    #[inline]
    pub const fn is_within_bounds(&self) -> bool {
        self.0 <= Self::MAX_BPS
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// The three GST components, each an independent percentage of the subtotal.
///
/// In practice a document carries either IGST (interstate) or CGST + SGST
/// (intrastate), but all three are stored and applied independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdown {
    pub igst: Rate,
    pub cgst: Rate,
    pub sgst: Rate,
}

impl TaxBreakdown {
    pub fn new(igst: Rate, cgst: Rate, sgst: Rate) -> Self {
        TaxBreakdown { igst, cgst, sgst }
    }

    /// Interstate supply: IGST only.
    pub fn interstate(igst: Rate) -> Self {
        TaxBreakdown {
            igst,
            ..Default::default()
        }
    }

    /// Intrastate supply: CGST + SGST.
    pub fn intrastate(cgst: Rate, sgst: Rate) -> Self {
        TaxBreakdown {
            cgst,
            sgst,
            ..Default::default()
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A single billable line.
///
/// `amount` is always `quantity × unit_price`. The fields are private so the
/// only ways to change quantity or price go through setters that recompute
/// the amount; deserialization recomputes it as well and ignores whatever
/// amount the payload carried. A product too large for i64 paise saturates
/// here and is rejected by `validate_line_item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LineItemInput")]
pub struct LineItem {
    id: String,
    description: String,
    quantity: i64,
    unit_price: Money,
    amount: Money,
}

/// Wire shape accepted for a line item. Any `amount` sent by a client is dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemInput {
    id: String,
    #[serde(default)]
    description: String,
    quantity: i64,
    unit_price: Money,
}

impl From<LineItemInput> for LineItem {
    fn from(input: LineItemInput) -> Self {
        LineItem::new(input.id, input.description, input.quantity, input.unit_price)
    }
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        LineItem {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_price,
            amount: unit_price.multiply_quantity(quantity),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.amount = self.unit_price.multiply_quantity(quantity);
    }

    pub fn set_unit_price(&mut self, unit_price: Money) {
        self.unit_price = unit_price;
        self.amount = unit_price.multiply_quantity(self.quantity);
    }
}

// =============================================================================
// Party
// =============================================================================

/// Client or issuer details printed on a document.
///
/// `pan_number` / `gst_number` are optional; when present they must be
/// format-valid before an invoice can be marked paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
}

impl Party {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Party {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Every derived monetary field of a document.
///
/// `discount_rate` is the *effective* rate after automatic volume tiers; the
/// rate the user typed is not kept separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub igst_amount: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub discount_rate: Rate,
    pub discount_amount: Money,
    pub total: Money,
}

impl Totals {
    /// IGST + CGST + SGST.
    pub fn tax_amount(&self) -> Money {
        self.igst_amount + self.cgst_amount + self.sgst_amount
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Which document family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DocumentKind {
    Invoice,
    Quotation,
}

impl DocumentKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quotation => "quotation",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocumentKind::Invoice),
            "quotation" => Ok(DocumentKind::Quotation),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec!["invoice".to_string(), "quotation".to_string()],
            }),
        }
    }
}

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InvoiceStatus {
    /// Being prepared; not yet issued.
    Draft,
    /// Issued and awaiting payment.
    Pending,
    /// Confirmed by the client before payment (variant flow).
    Confirmed,
    /// Settled. Terminal.
    Paid,
    /// Past due date without payment (set externally).
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Pending,
        InvoiceStatus::Confirmed,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Confirmed => "confirmed",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: InvoiceStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

/// Quotation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    /// Terminal.
    Rejected,
    /// An invoice was created from this quotation. Terminal.
    Converted,
}

impl QuotationStatus {
    pub const ALL: [QuotationStatus; 5] = [
        QuotationStatus::Draft,
        QuotationStatus::Sent,
        QuotationStatus::Accepted,
        QuotationStatus::Rejected,
        QuotationStatus::Converted,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
            QuotationStatus::Converted => "converted",
        }
    }
}

impl Default for QuotationStatus {
    fn default() -> Self {
        QuotationStatus::Draft
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuotationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: QuotationStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How an invoice was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMode {
    BankTransfer,
    Upi,
    Cash,
    Card,
    Cheque,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 5] = [
        PaymentMode::BankTransfer,
        PaymentMode::Upi,
        PaymentMode::Cash,
        PaymentMode::Card,
        PaymentMode::Cheque,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Upi => "upi",
            PaymentMode::Cash => "cash",
            PaymentMode::Card => "card",
            PaymentMode::Cheque => "cheque",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMode".to_string(),
                allowed: PaymentMode::ALL.iter().map(|m| m.to_string()).collect(),
            })
    }
}

/// Raw payment details as submitted by the "mark as paid" form.
///
/// Nothing here is trusted; [`crate::validation::validate_payment_details`]
/// turns it into a [`PaymentRecord`]. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentRequest {
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
}

impl PaymentRequest {
    pub fn new(mode: PaymentMode) -> Self {
        PaymentRequest {
            payment_mode: Some(mode.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn with_bank_account(mut self, account: impl Into<String>) -> Self {
        self.bank_account = Some(account.into());
        self
    }

    pub fn with_upi_id(mut self, upi_id: impl Into<String>) -> Self {
        self.upi_id = Some(upi_id.into());
        self
    }

    /// True when every field is absent or blank.
    pub fn is_blank(&self) -> bool {
        [
            &self.payment_mode,
            &self.transaction_id,
            &self.bank_account,
            &self.upi_id,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

/// Validated payment metadata stored on a paid invoice.
///
/// No money moves through this system; this only records how the client paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "paymentMode", rename_all = "snake_case")]
pub enum PaymentRecord {
    #[serde(rename_all = "camelCase")]
    BankTransfer {
        bank_account: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transaction_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Upi {
        upi_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transaction_id: Option<String>,
    },
    Cash,
    #[serde(rename_all = "camelCase")]
    Card {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transaction_id: Option<String>,
    },
    /// `transaction_id` holds the cheque number.
    #[serde(rename_all = "camelCase")]
    Cheque { transaction_id: String },
}

impl PaymentRecord {
    pub fn mode(&self) -> PaymentMode {
        match self {
            PaymentRecord::BankTransfer { .. } => PaymentMode::BankTransfer,
            PaymentRecord::Upi { .. } => PaymentMode::Upi,
            PaymentRecord::Cash => PaymentMode::Cash,
            PaymentRecord::Card { .. } => PaymentMode::Card,
            PaymentRecord::Cheque { .. } => PaymentMode::Cheque,
        }
    }

    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            PaymentRecord::BankTransfer { transaction_id, .. }
            | PaymentRecord::Upi { transaction_id, .. }
            | PaymentRecord::Card { transaction_id } => transaction_id.as_deref(),
            PaymentRecord::Cheque { transaction_id } => Some(transaction_id),
            PaymentRecord::Cash => None,
        }
    }

    /// The mode-specific identifier (bank account or UPI id), if the mode has one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            PaymentRecord::BankTransfer { bank_account, .. } => Some(bank_account),
            PaymentRecord::Upi { upi_id, .. } => Some(upi_id),
            _ => None,
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// What a create/edit form submits before pricing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    pub client: Party,
    pub issuer: Party,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub taxes: TaxBreakdown,
    /// The discount rate the user asked for (before automatic tiers).
    #[serde(default)]
    pub discount_rate: Rate,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// An invoice or a quotation.
///
/// `totals` is always the calculator's output for `items`, `taxes` and the
/// discount input; it is never edited on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<S> {
    pub id: String,
    pub number: String,
    pub owner_id: String,
    pub client: Party,
    pub issuer: Party,
    pub items: Vec<LineItem>,
    pub taxes: TaxBreakdown,
    pub totals: Totals,
    #[serde(default)]
    pub notes: String,
    pub status: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Quotation → the invoice created from it; invoice → its source quotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_document_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub type Invoice = Document<InvoiceStatus>;
pub type Quotation = Document<QuotationStatus>;

impl<S> Document<S> {
    pub fn total(&self) -> Money {
        self.totals.total
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
