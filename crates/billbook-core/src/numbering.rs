//! # Document Numbers
//!
//! Human-facing numbers printed on invoices and quotations.
//!
//! ```text
//!   INV-20261016-0007
//!   ─┬─ ───┬──── ──┬─
//!    │     │       └── per-day sequence, allocated by the store
//!    │     └────────── issue date (YYYYMMDD)
//!    └──────────────── INV for invoices, QUO for quotations
//! ```
//!
//! Invoices and quotations draw from separate sequences and prefixes, so an
//! invoice created from a quotation can never reuse the quotation's number.

use chrono::NaiveDate;

use crate::types::DocumentKind;

impl DocumentKind {
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Quotation => "QUO",
        }
    }
}

/// Formats a document number.
///
/// ## Example
/// ```rust
/// use billbook_core::numbering::format_document_number;
/// use billbook_core::types::DocumentKind;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// assert_eq!(
///     format_document_number(DocumentKind::Invoice, date, 7),
///     "INV-20261016-0007"
/// );
/// ```
pub fn format_document_number(kind: DocumentKind, date: NaiveDate, sequence: u32) -> String {
    format!("{}-{}-{:04}", kind.prefix(), date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(
            format_document_number(DocumentKind::Quotation, day(), 1),
            "QUO-20261016-0001"
        );
        // sequences past 9999 widen instead of wrapping
        assert_eq!(
            format_document_number(DocumentKind::Invoice, day(), 12_345),
            "INV-20261016-12345"
        );
    }

    #[test]
    fn test_kinds_never_share_numbers() {
        assert_ne!(
            format_document_number(DocumentKind::Invoice, day(), 3),
            format_document_number(DocumentKind::Quotation, day(), 3)
        );
    }
}
