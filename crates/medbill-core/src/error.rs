//! # Error Types
//!
//! Domain-specific error types for medbill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medbill-core errors (this file)                                       │
//! │  ├── CoreError        - Billing rule violations                        │
//! │  └── ValidationError  - Malformed draft input (field-level)            │
//! │                                                                         │
//! │  medbill-db errors (separate crate)                                    │
//! │  └── DbError          - Persistence failures + rejected drafts         │
//! │                                                                         │
//! │  REST errors (apps/api)                                                │
//! │  └── ApiError         - What the dashboard sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Dashboard     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Name the offending field, including the line index for line items
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Billing rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The draft failed input validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The computed total is negative and the configured policy rejects it.
    ///
    /// ## When This Occurs
    /// - Discount larger than subtotal + tax + shipping
    /// - `NegativeTotalPolicy::Reject` is configured
    #[error("Invoice total {total} is negative (discount exceeds billed amount)")]
    NegativeTotal { total: Money },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any invoice number is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Amount or quantity below zero.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparsable policy name, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Arithmetic on the field exceeded the representable range.
    #[error("{field} is too large to compute")]
    Overflow { field: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Overflow { field } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustNotBeNegative {
            field: "lineItems[0].quantity".to_string(),
        };
        assert_eq!(err.to_string(), "lineItems[0].quantity must not be negative");
        assert_eq!(err.field(), "lineItems[0].quantity");

        let err = ValidationError::Required {
            field: "patientName".to_string(),
        };
        assert_eq!(err.to_string(), "patientName is required");
    }

    #[test]
    fn test_negative_total_message() {
        let err = CoreError::NegativeTotal {
            total: Money::from(-30),
        };
        assert_eq!(
            err.to_string(),
            "Invoice total -30.00 is negative (discount exceeds billed amount)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "patientId".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
