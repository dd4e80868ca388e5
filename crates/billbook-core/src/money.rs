//! # Money Module
//!
//! Provides the `Money` type for every amount on an invoice or quotation.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FLOATS ON A TAX INVOICE                                                │
//! │                                                                         │
//! │  subtotal * 18 / 100 with floats:                                       │
//! │    1234.55 * 0.18 = 222.21899999999997   ❌ prints as 222.22 or 222.21 │
//! │                                                                         │
//! │  IGST + CGST + SGST summed as floats drift apart from the printed      │
//! │  per-tax lines, and the grand total stops matching the PDF.            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    123455 paise × 1800 bps → 22221.9 → rounds to 22222 paise           │
//! │    Every line is rounded once, every sum is exact                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billbook_core::money::Money;
//! use billbook_core::types::Rate;
//!
//! let unit_price = Money::from_major_minor(100, 0);   // ₹100.00
//! let amount = unit_price.multiply_quantity(2);       // ₹200.00
//! let igst = amount.percentage(Rate::from_percentage(18.0));
//! assert_eq!(igst, Money::from_major_minor(36, 0));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: totals can go negative only through explicit subtraction,
///   and callers can detect it with [`Money::is_negative`]
/// - **Serialized as a bare integer**: documents store `"total": 23600`
///
/// ## Where Money Flows
/// ```text
/// LineItem.unit_price × quantity ──► LineItem.amount
///                                        │
///                           Σ amount ────┴──► Totals.subtotal
///                                                  │
///                    ┌─────────────────────────────┼───────────────────┐
///                    ▼                             ▼                   ▼
///             igst/cgst/sgst amounts        discount amount      (Ledger rows)
///                    └──────────────┬──────────────┘
///                                   ▼
///                              Totals.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let price = Money::from_minor(149_900); // ₹1,499.00
    /// assert_eq!(price.minor(), 149_900);
    /// ```
    #[inline]
    pub const fn from_minor(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the major part carries the sign:
    /// `from_major_minor(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a decimal amount in major units, rounding to the nearest paisa.
    ///
    /// Only meant for configuration and form boundaries (`threshold = 5000.0`
    /// in `billbook.toml`). All arithmetic after that point stays integral.
    pub fn from_major_rounded(major: f64) -> Self {
        Money((major * 100.0).round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as a float in major units (for display only).
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a percentage and returns the resulting amount.
    ///
    /// ## Rounding
    /// Half-up to the nearest paisa: `(amount * bps + 5000) / 10000`, computed
    /// in i128 so large invoices cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::Rate;
    ///
    /// // ₹150.05 at 5% = ₹7.5025 → ₹7.50
    /// let discount = Money::from_minor(15_005).percentage(Rate::from_bps(500));
    /// assert_eq!(discount.minor(), 750);
    /// ```
    pub fn percentage(&self, rate: Rate) -> Money {
        let scaled = (self.0 as i128 * rate.bps() as i128 + 5000).div_euclid(10_000);
        Money(scaled as i64)
    }

    /// Multiplies a unit price by a quantity, saturating at the i64 bounds.
    ///
    /// A saturated amount is never priced: [`Money::checked_multiply_quantity`]
    /// is what validation and the calculator use.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when `quantity × unit price` does not fit in paise.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering (`₹1,499.00` style without grouping).
///
/// The frontend formats amounts for display; this is for logs and tests.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_parts() {
        let money = Money::from_minor(149_999);
        assert_eq!(money.major(), 1499);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor_negative() {
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
        assert_eq!(Money::from_major_minor(10, 5).minor(), 1005);
    }

    #[test]
    fn test_from_major_rounded() {
        assert_eq!(Money::from_major_rounded(1000.01).minor(), 100_001);
        assert_eq!(Money::from_major_rounded(5000.0).minor(), 500_000);
        assert_eq!(Money::from_major_rounded(0.005).minor(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(23_600).to_string(), "₹236.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_percentage_exact() {
        // ₹200 at 18% = ₹36
        let igst = Money::from_minor(20_000).percentage(Rate::from_bps(1800));
        assert_eq!(igst.minor(), 3600);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 1 paisa at 50% = 0.5 paisa → 1 paisa
        assert_eq!(Money::from_minor(1).percentage(Rate::from_bps(5000)).minor(), 1);
        // 1 paisa at 49.99% → 0
        assert_eq!(Money::from_minor(1).percentage(Rate::from_bps(4999)).minor(), 0);
    }

    #[test]
    fn test_percentage_of_negative_amount_rounds_toward_positive() {
        // -1 paisa at 50% = -0.5 → rounds to 0 with half-up
        assert_eq!(Money::from_minor(-1).percentage(Rate::from_bps(5000)).minor(), 0);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_minor(100), Money::from_minor(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.minor(), 350);
        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_quantity_overflow_is_detected() {
        let price = Money::from_minor(4);
        assert_eq!(price.checked_multiply_quantity(4_611_686_018_427_387_904), None);
        assert_eq!(price.multiply_quantity(4_611_686_018_427_387_904).minor(), i64::MAX);
        assert_eq!(price.checked_multiply_quantity(3), Some(Money::from_minor(12)));

        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_sub(Money::from_minor(1)), None);
    }

    #[test]
    fn test_arithmetic_and_sign_checks() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(1500);
        assert!((a - b).is_negative());
        assert!((b - a).is_positive());
        assert_eq!((-a).minor(), -1000);
        let mut c = a;
        c += b;
        c -= Money::from_minor(500);
        assert_eq!(c.minor(), 2000);
    }
}
