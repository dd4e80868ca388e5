//! # Document Calculator
//!
//! The single place where document totals are computed. Create forms, edit
//! forms and quotation conversion all go through here.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       compute_totals                                    │
//! │                                                                         │
//! │  items ──► subtotal = Σ amount                                         │
//! │                │                                                        │
//! │                ├──► igst_amount = subtotal × igst                       │
//! │                ├──► cgst_amount = subtotal × cgst                       │
//! │                ├──► sgst_amount = subtotal × sgst                       │
//! │                │                                                        │
//! │                ├──► effective discount = max(user rate, tier rate)      │
//! │                │         │                                              │
//! │                │         ▼                                              │
//! │                └──► discount_amount = subtotal × effective              │
//! │                                                                         │
//! │  total = subtotal + igst + cgst + sgst − discount                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Volume Tiers (default)
//! | subtotal above | automatic discount |
//! |----------------|--------------------|
//! | ₹5,000.00      | 10%                |
//! | ₹1,000.00      | 5%                 |
//!
//! Tiers only ever raise the user's rate, never lower it. Crossing a tier is
//! strict: a subtotal of exactly ₹1,000.00 gets no automatic discount.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{LineItem, Rate, TaxBreakdown, Totals};
use crate::validation::validate_rate;

// =============================================================================
// Discount Policy
// =============================================================================

/// One automatic discount band: subtotals strictly above `threshold` get at
/// least `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub threshold: Money,
    pub rate: Rate,
}

impl DiscountTier {
    pub const fn new(threshold: Money, rate: Rate) -> Self {
        DiscountTier { threshold, rate }
    }
}

/// The set of automatic discount bands.
///
/// An empty policy disables automatic discounts entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    tiers: Vec<DiscountTier>,
}

impl DiscountPolicy {
    pub fn new(tiers: Vec<DiscountTier>) -> Self {
        DiscountPolicy { tiers }
    }

    /// No automatic discounts; only the user's rate applies.
    pub fn none() -> Self {
        DiscountPolicy { tiers: Vec::new() }
    }

    pub fn tiers(&self) -> &[DiscountTier] {
        &self.tiers
    }

    /// The automatic rate earned by `subtotal`. When several bands are
    /// crossed the highest rate wins.
    pub fn tier_rate(&self, subtotal: Money) -> Rate {
        self.tiers
            .iter()
            .filter(|tier| subtotal > tier.threshold)
            .map(|tier| tier.rate)
            .max()
            .unwrap_or_default()
    }

    /// `max(requested, tier_rate(subtotal))`.
    pub fn effective_rate(&self, subtotal: Money, requested: Rate) -> Rate {
        requested.max(self.tier_rate(subtotal))
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy::new(vec![
            DiscountTier::new(Money::from_major_minor(5000, 0), Rate::from_bps(1000)),
            DiscountTier::new(Money::from_major_minor(1000, 0), Rate::from_bps(500)),
        ])
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes [`Totals`] for a set of line items under a discount policy.
///
/// Pure and deterministic: the same inputs always give the same totals, and
/// feeding the effective rate back in changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCalculator {
    policy: DiscountPolicy,
}

impl DocumentCalculator {
    pub fn new(policy: DiscountPolicy) -> Self {
        DocumentCalculator { policy }
    }

    pub fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    /// Computes every derived monetary field.
    ///
    /// An empty item list is valid here and yields all zeros; requiring at
    /// least one item is a form rule.
    ///
    /// ## Errors
    /// `OutOfRange` when any tax rate or the discount rate is above 100%, or
    /// when the subtotal or total does not fit in paise.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::calculator::DocumentCalculator;
    /// use billbook_core::money::Money;
    /// use billbook_core::types::{LineItem, Rate, TaxBreakdown};
    ///
    /// let items = vec![LineItem::new("li-1", "Consulting", 2, Money::from_major_minor(100, 0))];
    /// let taxes = TaxBreakdown::interstate(Rate::from_percentage(18.0));
    ///
    /// let totals = DocumentCalculator::default()
    ///     .compute_totals(&items, &taxes, Rate::zero())
    ///     .unwrap();
    /// assert_eq!(totals.total, Money::from_major_minor(236, 0));
    /// ```
    pub fn compute_totals(
        &self,
        items: &[LineItem],
        taxes: &TaxBreakdown,
        discount_rate: Rate,
    ) -> ValidationResult<Totals> {
        validate_rate(taxes.igst, "igst")?;
        validate_rate(taxes.cgst, "cgst")?;
        validate_rate(taxes.sgst, "sgst")?;
        validate_rate(discount_rate, "discountRate")?;

        // recomputed with checked math; stored line amounts saturate
        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |acc, item| {
                item.unit_price()
                    .checked_multiply_quantity(item.quantity())
                    .and_then(|amount| acc.checked_add(amount))
            })
            .ok_or_else(|| overflow("subtotal"))?;

        let igst_amount = subtotal.percentage(taxes.igst);
        let cgst_amount = subtotal.percentage(taxes.cgst);
        let sgst_amount = subtotal.percentage(taxes.sgst);

        let effective = self.policy.effective_rate(subtotal, discount_rate);
        let discount_amount = subtotal.percentage(effective);

        let total = subtotal
            .checked_add(igst_amount)
            .and_then(|t| t.checked_add(cgst_amount))
            .and_then(|t| t.checked_add(sgst_amount))
            .and_then(|t| t.checked_sub(discount_amount))
            .ok_or_else(|| overflow("total"))?;

        Ok(Totals {
            subtotal,
            igst_amount,
            cgst_amount,
            sgst_amount,
            discount_rate: effective,
            discount_amount,
            total,
        })
    }
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// [`DocumentCalculator::compute_totals`] with the default discount tiers.
pub fn compute_totals(
    items: &[LineItem],
    taxes: &TaxBreakdown,
    discount_rate: Rate,
) -> ValidationResult<Totals> {
    DocumentCalculator::default().compute_totals(items, taxes, discount_rate)
}

// =============================================================================
// Unit Tests
// =============================================================================
