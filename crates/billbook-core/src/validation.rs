//! # Validation Module
//!
//! Payment-detail and form validation for Billbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form rules (validate_draft)                                  │
//! │  ├── At least one line item, unique ids                                │
//! │  ├── Quantity > 0, unit price >= 0                                     │
//! │  └── Rates within 0–100%                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Settlement rules (validate_settlement)                       │
//! │  ├── Payment mode known                                                │
//! │  ├── PAN / GST of client and issuer, when present                     │
//! │  └── Mode-specific reference fields                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── UNIQUE (kind, number)                                             │
//! │                                                                         │
//! │  Every check stops at the first failure and names the field.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billbook_core::types::{PaymentMode, PaymentRequest};
//! use billbook_core::validation::validate_payment_details;
//!
//! let request = PaymentRequest::new(PaymentMode::Upi).with_upi_id("9999999999@upi");
//! let record = validate_payment_details(&request).unwrap();
//! assert_eq!(record.mode(), PaymentMode::Upi);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{DocumentDraft, LineItem, Party, PaymentMode, PaymentRecord, PaymentRequest, Rate};

// =============================================================================
// Patterns
// =============================================================================

static PAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid PAN regex"));

static GST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}[A-Z]{5}\d{4}[A-Z][A-Z0-9]Z[A-Z0-9]$").expect("valid GST regex")
});

static BANK_ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{11}$").expect("valid bank account regex"));

static UTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^UTR[A-Z0-9]{13}$").expect("valid UTR regex"));

static UPI_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+$").expect("valid UPI id regex"));

static UPI_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}@upi$").expect("valid UPI phone regex"));

static CARD_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T\d{21}$").expect("valid card reference regex"));

static CHEQUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid cheque regex"));

// =============================================================================
// Helpers
// =============================================================================

/// Blank strings from a form count as "not supplied".
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> ValidationResult<&'a str> {
    present(value).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

fn check_format(value: &str, re: &Regex, field: &str, reason: &str) -> ValidationResult<()> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        })
    }
}

// =============================================================================
// Tax Identifiers
// =============================================================================

/// Validates a PAN (Permanent Account Number), e.g. `ABCDE1234F`.
pub fn validate_pan(pan: &str, field: &str) -> ValidationResult<()> {
    check_format(pan, &PAN_RE, field, "expected a PAN like ABCDE1234F")
}

/// Validates a GSTIN, e.g. `27ABCDE1234F1Z5`.
pub fn validate_gst(gst: &str, field: &str) -> ValidationResult<()> {
    check_format(gst, &GST_RE, field, "expected a GSTIN like 27ABCDE1234F1Z5")
}

/// Checks client and issuer PAN, then client and issuer GST.
///
/// Absent identifiers are fine; present ones must be well-formed.
pub fn validate_tax_identifiers(client: &Party, issuer: &Party) -> ValidationResult<()> {
    if let Some(pan) = present(&client.pan_number) {
        validate_pan(pan, "clientPanNumber")?;
    }
    if let Some(pan) = present(&issuer.pan_number) {
        validate_pan(pan, "companyPanNumber")?;
    }
    if let Some(gst) = present(&client.gst_number) {
        validate_gst(gst, "clientGstNumber")?;
    }
    if let Some(gst) = present(&issuer.gst_number) {
        validate_gst(gst, "companyGstNumber")?;
    }
    Ok(())
}

// =============================================================================
// Payment Details
// =============================================================================

fn parse_mode(request: &PaymentRequest) -> ValidationResult<PaymentMode> {
    required(&request.payment_mode, "paymentMode")?.parse()
}

/// Turns a raw payment form into a validated [`PaymentRecord`].
///
/// ## Rules per mode
/// ```text
/// bank_transfer  bankAccount required (11 digits), transactionId optional (UTR + 13)
/// upi            upiId required (name@handle or 10 digits@upi), transactionId optional
/// card           transactionId optional (T + 21 digits)
/// cheque         transactionId required (6-digit cheque number)
/// cash           transactionId forbidden
/// ```
///
/// A UPI transaction id is checked against the GSTIN pattern.
pub fn validate_payment_details(request: &PaymentRequest) -> ValidationResult<PaymentRecord> {
    let mode = parse_mode(request)?;
    record_for_mode(mode, request)
}

fn record_for_mode(mode: PaymentMode, request: &PaymentRequest) -> ValidationResult<PaymentRecord> {
    let transaction_id = present(&request.transaction_id);

    match mode {
        PaymentMode::BankTransfer => {
            let account = required(&request.bank_account, "bankAccount")?;
            check_format(account, &BANK_ACCOUNT_RE, "bankAccount", "expected 11 digits")?;
            if let Some(id) = transaction_id {
                check_format(
                    id,
                    &UTR_RE,
                    "transactionId",
                    "expected UTR followed by 13 letters or digits",
                )?;
            }
            Ok(PaymentRecord::BankTransfer {
                bank_account: account.to_string(),
                transaction_id: transaction_id.map(str::to_string),
            })
        }
        PaymentMode::Upi => {
            let upi_id = required(&request.upi_id, "upiId")?;
            if !(UPI_ID_RE.is_match(upi_id) || UPI_PHONE_RE.is_match(upi_id)) {
                return Err(ValidationError::InvalidFormat {
                    field: "upiId".to_string(),
                    reason: "expected name@handle or a 10-digit number@upi".to_string(),
                });
            }
            if let Some(id) = transaction_id {
                // Same pattern as a GSTIN. Unconfirmed upstream; do not loosen silently.
                check_format(id, &GST_RE, "transactionId", "unrecognised UPI reference")?;
            }
            Ok(PaymentRecord::Upi {
                upi_id: upi_id.to_string(),
                transaction_id: transaction_id.map(str::to_string),
            })
        }
        PaymentMode::Card => {
            if let Some(id) = transaction_id {
                check_format(id, &CARD_REF_RE, "transactionId", "expected T followed by 21 digits")?;
            }
            Ok(PaymentRecord::Card {
                transaction_id: transaction_id.map(str::to_string),
            })
        }
        PaymentMode::Cheque => {
            let number = required(&request.transaction_id, "transactionId")?;
            check_format(number, &CHEQUE_RE, "transactionId", "expected a 6-digit cheque number")?;
            Ok(PaymentRecord::Cheque {
                transaction_id: number.to_string(),
            })
        }
        PaymentMode::Cash => {
            if transaction_id.is_some() {
                return Err(ValidationError::Forbidden {
                    field: "transactionId".to_string(),
                    reason: "not allowed for cash".to_string(),
                });
            }
            Ok(PaymentRecord::Cash)
        }
    }
}

/// Everything that must hold before an invoice may become `paid`.
///
/// Order: payment mode → client PAN → issuer PAN → client GST → issuer GST →
/// mode-specific fields. The first failure is returned.
pub fn validate_settlement(
    request: &PaymentRequest,
    client: &Party,
    issuer: &Party,
) -> ValidationResult<PaymentRecord> {
    let mode = parse_mode(request)?;
    validate_tax_identifiers(client, issuer)?;
    record_for_mode(mode, request)
}

// =============================================================================
// Form Rules
// =============================================================================

/// Rejects rates above 100%.
pub fn validate_rate(rate: Rate, field: &str) -> ValidationResult<()> {
    if rate.is_within_bounds() {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        })
    }
}

pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.id().trim().is_empty() {
        return Err(ValidationError::Required {
            field: "items.id".to_string(),
        });
    }
    if item.description().trim().is_empty() {
        return Err(ValidationError::Required {
            field: "items.description".to_string(),
        });
    }
    if item.quantity() <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "items.quantity".to_string(),
        });
    }
    if item.unit_price() < Money::zero() {
        return Err(ValidationError::OutOfRange {
            field: "items.unitPrice".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    if item.unit_price().checked_multiply_quantity(item.quantity()).is_none() {
        return Err(ValidationError::OutOfRange {
            field: "items.amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

fn validate_email(email: &str, field: &str) -> ValidationResult<()> {
    if email.is_empty() || email.contains('@') {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected an email address".to_string(),
        })
    }
}

/// Form-layer checks run before a draft is priced.
///
/// The calculator itself accepts an empty item list; "at least one item" is
/// enforced here.
pub fn validate_draft(draft: &DocumentDraft) -> ValidationResult<()> {
    if draft.client.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "clientName".to_string(),
        });
    }
    validate_email(draft.client.email.trim(), "clientEmail")?;
    validate_email(draft.issuer.email.trim(), "companyEmail")?;

    if draft.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for item in &draft.items {
        validate_line_item(item)?;
        if !seen.insert(item.id()) {
            return Err(ValidationError::Duplicate {
                field: "items.id".to_string(),
                value: item.id().to_string(),
            });
        }
    }

    validate_rate(draft.taxes.igst, "igst")?;
    validate_rate(draft.taxes.cgst, "cgst")?;
    validate_rate(draft.taxes.sgst, "sgst")?;
    validate_rate(draft.discount_rate, "discountRate")?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
