//! # billbook-core: Pure Business Logic for Billbook
//!
//! Pricing and lifecycle rules for invoices and quotations, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │   Invoice form ──► Quotation form ──► Payments ──► Dashboard    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          billbook-db (DocumentService, stores, config)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ billbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌────────────┐ ┌───────────┐ ┌────────────────┐  │   │
//! │  │  │  money   │ │ calculator │ │ lifecycle │ │   validation   │  │   │
//! │  │  │  types   │ │  Totals    │ │ statuses  │ │ PAN/GST/UPI... │  │   │
//! │  │  └──────────┘ └────────────┘ └───────────┘ └────────────────┘  │   │
//! │  │  ┌──────────┐ ┌────────────┐                                    │   │
//! │  │  │  ledger  │ │ numbering  │                                    │   │
//! │  │  └──────────┘ └────────────┘                                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Documents, line items, parties, statuses, payments
//! - [`money`] - Money in integer paise
//! - [`calculator`] - Subtotal, GST, volume discount and total
//! - [`lifecycle`] - Status machines, settlement, conversion
//! - [`validation`] - Payment detail and form rules
//! - [`ledger`] - Transactions and dashboard aggregates
//! - [`numbering`] - `INV-…` / `QUO-…` numbers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use billbook_core::{compute_totals, LineItem, Money, Rate, TaxBreakdown};
//!
//! let items = vec![LineItem::new("li-1", "Website", 1, Money::from_major_minor(6000, 0))];
//! let totals = compute_totals(&items, &TaxBreakdown::default(), Rate::zero()).unwrap();
//!
//! // Above ₹5,000 the 10% volume discount kicks in automatically
//! assert_eq!(totals.discount_rate, Rate::from_bps(1000));
//! assert_eq!(totals.total, Money::from_major_minor(5400, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{compute_totals, DiscountPolicy, DiscountTier, DocumentCalculator};
pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use lifecycle::{Conversion, DocumentStatus};
pub use money::Money;
pub use types::*;
