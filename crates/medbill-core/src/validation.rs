//! # Validation Module
//!
//! Input validation for invoice drafts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin dashboard (React)                                      │
//! │  ├── Required form fields                                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: billing rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE invoice_no                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check runs before an invoice number is allocated, so a rejected
//! draft never consumes a number.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{InvoiceDraft, LineItem, PatientSnapshot};
use crate::{
    MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_EMAIL_LEN, MAX_LINE_ITEMS, MAX_NAME_LEN,
    MAX_PATIENT_ID_LEN, MAX_PHONE_LEN, MAX_REMARKS_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    optional(field, value, max)
}

fn optional(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a line item description: it must not be empty after trimming.
///
/// The length cap is a storage rule, see [`validate_draft_envelope`].
pub fn validate_description(field: &str, description: &str) -> ValidationResult<()> {
    if description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates the patient snapshot copied onto an invoice.
///
/// ## Rules
/// - `patientId` and `patientName` are required
/// - `address`, `phone`, `email` are optional but length-limited
/// - A non-empty email must look like `local@domain`
///
/// ## Example
/// ```rust
/// use medbill_core::types::PatientSnapshot;
/// use medbill_core::validation::validate_patient;
///
/// let mut patient = PatientSnapshot {
///     patient_id: "UHID-7".to_string(),
///     patient_name: "Bala".to_string(),
///     ..Default::default()
/// };
/// assert!(validate_patient(&patient).is_ok());
///
/// patient.patient_name = "  ".to_string();
/// assert!(validate_patient(&patient).is_err());
/// ```
pub fn validate_patient(patient: &PatientSnapshot) -> ValidationResult<()> {
    required("patientId", &patient.patient_id, MAX_PATIENT_ID_LEN)?;
    required("patientName", &patient.patient_name, MAX_NAME_LEN)?;
    optional("address", &patient.address, MAX_ADDRESS_LEN)?;
    optional("phone", &patient.phone, MAX_PHONE_LEN)?;
    validate_email(&patient.email)
}

/// Validates an optional email address.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }

    optional("email", email, MAX_EMAIL_LEN)?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected local@domain".to_string(),
        }),
    }
}

/// Validates free-text remarks.
pub fn validate_remarks(remarks: &str) -> ValidationResult<()> {
    optional("remarks", remarks, MAX_REMARKS_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity.
///
/// ## Rules
/// - Must be `>= 0` (zero-quantity lines are kept for display)
/// - Fractions are allowed
pub fn validate_quantity(field: &str, quantity: Decimal) -> ValidationResult<()> {
    if quantity < Decimal::ZERO {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an amount (unit price, discount, tax, shipping).
///
/// ## Example
/// ```rust
/// use medbill_core::money::Money;
/// use medbill_core::validation::validate_amount;
///
/// assert!(validate_amount("unitPrice", Money::from(500)).is_ok());
/// assert!(validate_amount("unitPrice", Money::zero()).is_ok());
/// assert!(validate_amount("unitPrice", Money::from(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates one line item; `index` is used in field names
/// (`lineItems[1].unitPrice`).
pub fn validate_line_item(index: usize, item: &LineItem) -> ValidationResult<()> {
    validate_description(&format!("lineItems[{}].description", index), &item.description)?;
    validate_quantity(&format!("lineItems[{}].quantity", index), item.quantity)?;
    validate_amount(&format!("lineItems[{}].unitPrice", index), item.unit_price)
}

/// Validates the parts of a draft that the total computation does not look
/// at before it is stored: patient snapshot, remarks, the line-item count
/// and description lengths.
pub fn validate_draft_envelope(draft: &InvoiceDraft) -> ValidationResult<()> {
    validate_patient(&draft.patient)?;
    validate_remarks(&draft.remarks)?;

    if draft.line_items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::TooLong {
            field: "lineItems".to_string(),
            max: MAX_LINE_ITEMS,
        });
    }

    for (index, item) in draft.line_items.iter().enumerate() {
        optional(
            &format!("lineItems[{}].description", index),
            item.description.trim(),
            MAX_DESCRIPTION_LEN,
        )?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientSnapshot {
        PatientSnapshot {
            patient_id: "UHID-0001".to_string(),
            patient_name: "Asha Rao".to_string(),
            address: "12 MG Road".to_string(),
            phone: "9876543210".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_validate_patient() {
        assert!(validate_patient(&patient()).is_ok());

        let mut missing_id = patient();
        missing_id.patient_id = String::new();
        assert_eq!(validate_patient(&missing_id).unwrap_err().field(), "patientId");

        let mut long_name = patient();
        long_name.patient_name = "A".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            validate_patient(&long_name),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("b@x.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("q", Decimal::ONE).is_ok());
        assert!(validate_quantity("q", Decimal::ZERO).is_ok());
        assert!(validate_quantity("q", Decimal::new(5, 1)).is_ok());
        assert!(validate_quantity("q", Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn test_validate_line_item_names_the_field() {
        let bad_price = LineItem::new("X-ray", 1, Money::from(-5));
        let err = validate_line_item(3, &bad_price).unwrap_err();
        assert_eq!(err.field(), "lineItems[3].unitPrice");

        let blank = LineItem::new("   ", 1, Money::from(5));
        let err = validate_line_item(0, &blank).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Required {
                field: "lineItems[0].description".to_string()
            }
        );
    }

    #[test]
    fn test_long_description_is_a_storage_limit_only() {
        let long = LineItem::new("D".repeat(MAX_DESCRIPTION_LEN + 1), 1, Money::from(10));
        assert!(validate_line_item(0, &long).is_ok());

        let draft = InvoiceDraft {
            patient: patient(),
            line_items: vec![LineItem::new("ECG", 1, Money::from(300)), long],
            ..Default::default()
        };
        let err = validate_draft_envelope(&draft).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "lineItems[1].description".to_string(),
                max: MAX_DESCRIPTION_LEN,
            }
        );
    }
}
