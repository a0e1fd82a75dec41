//! # Invoice Totals
//!
//! The aggregator that turns line items and adjustments into the
//! authoritative invoice total.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  subtotal = Σ quantity_i × unit_price_i      (input order, exact)       │
//! │  total    = subtotal − discount + tax + shipping                        │
//! │                                                                         │
//! │  Consultation   1 × 500.00 =  500.00                                    │
//! │  Lab test       2 × 150.00 =  300.00                                    │
//! │                              ───────                                    │
//! │  Subtotal                     800.00                                    │
//! │  Discount                    − 50.00                                    │
//! │  Tax                         + 20.00                                    │
//! │  Shipping                    +  0.00                                    │
//! │                              ───────                                    │
//! │  Total                        770.00                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adjustments are absolute amounts, not percentages of the subtotal.
//! Nothing is rounded here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{InvoiceDraft, LineItem, NegativeTotalPolicy};
use crate::validation::{validate_amount, validate_line_item, ValidationResult};

/// Result of [`compute_total`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// True when the discount exceeds everything billed.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.total.is_negative()
    }

    /// Applies the configured negative-total policy.
    ///
    /// ```rust
    /// use medbill_core::money::Money;
    /// use medbill_core::totals::compute_total;
    /// use medbill_core::types::{LineItem, NegativeTotalPolicy};
    ///
    /// let items = [LineItem::new("Dressing", 1, Money::from(40))];
    /// let totals = compute_total(&items, Money::from(100), Money::zero(), Money::zero()).unwrap();
    /// assert!(totals.is_negative());
    ///
    /// let clamped = totals.apply_policy(NegativeTotalPolicy::Clamp).unwrap();
    /// assert_eq!(clamped.total, Money::zero());
    /// assert!(totals.apply_policy(NegativeTotalPolicy::Reject).is_err());
    /// ```
    pub fn apply_policy(self, policy: NegativeTotalPolicy) -> CoreResult<Self> {
        if !self.is_negative() {
            return Ok(self);
        }

        match policy {
            NegativeTotalPolicy::Allow => Ok(self),
            NegativeTotalPolicy::Clamp => Ok(InvoiceTotals {
                total: Money::zero(),
                ..self
            }),
            NegativeTotalPolicy::Reject => Err(CoreError::NegativeTotal { total: self.total }),
        }
    }
}

/// Computes the authoritative invoice total.
///
/// ## Preconditions
/// - every line item has a non-empty description
/// - every quantity and unit price is `>= 0`
/// - discount, tax and shipping are `>= 0`
///
/// A violated precondition, or an amount too large to represent, fails with
/// [`ValidationError`]. A negative *result* is not an error; check
/// [`InvoiceTotals::is_negative`].
///
/// ## Example
/// ```rust
/// use medbill_core::money::Money;
/// use medbill_core::totals::compute_total;
/// use medbill_core::types::LineItem;
///
/// let items = [
///     LineItem::new("Consultation", 1, Money::from(500)),
///     LineItem::new("Lab test", 2, Money::from(150)),
/// ];
/// let totals = compute_total(&items, Money::from(50), Money::from(20), Money::zero()).unwrap();
/// assert_eq!(totals.subtotal, Money::from(800));
/// assert_eq!(totals.total, Money::from(770));
/// ```
pub fn compute_total(
    line_items: &[LineItem],
    discount: Money,
    tax: Money,
    shipping: Money,
) -> ValidationResult<InvoiceTotals> {
    validate_amount("discount", discount)?;
    validate_amount("tax", tax)?;
    validate_amount("shipping", shipping)?;

    let mut subtotal = Money::zero();
    for (index, item) in line_items.iter().enumerate() {
        validate_line_item(index, item)?;

        let line_total = item.line_total().ok_or_else(|| ValidationError::Overflow {
            field: format!("lineItems[{}]", index),
        })?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| overflow("subtotal"))?;
    }

    let total = subtotal
        .checked_sub(discount)
        .and_then(|t| t.checked_add(tax))
        .and_then(|t| t.checked_add(shipping))
        .ok_or_else(|| overflow("total"))?;

    Ok(InvoiceTotals {
        subtotal,
        discount,
        tax,
        shipping,
        total,
    })
}

/// Runs [`compute_total`] over a draft. Any `total` sent with the draft is
/// ignored.
pub fn compute_draft_totals(draft: &InvoiceDraft) -> ValidationResult<InvoiceTotals> {
    compute_total(&draft.line_items, draft.discount, draft.tax, draft.shipping)
}

// =============================================================================
// Warnings
// =============================================================================

/// Non-fatal findings reported alongside a created invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BillingWarning {
    /// Stored with a negative total (`NegativeTotalPolicy::Allow`).
    NegativeTotal { total: Money },
    /// Negative total replaced by zero (`NegativeTotalPolicy::Clamp`).
    TotalClamped { computed: Money },
    /// The client sent a total that disagrees with the computed one.
    ClientTotalIgnored { submitted: Money, computed: Money },
}

impl fmt::Display for BillingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingWarning::NegativeTotal { total } => {
                write!(f, "Invoice total {} is negative; discount exceeds billed amount", total)
            }
            BillingWarning::TotalClamped { computed } => {
                write!(f, "Negative total {} was stored as 0.00", computed)
            }
            BillingWarning::ClientTotalIgnored {
                submitted,
                computed,
            } => write!(
                f,
                "Submitted total {} ignored; computed total is {}",
                submitted, computed
            ),
        }
    }
}

/// Lists the warnings for a draft whose totals were computed as `computed`
/// (before the policy was applied).
///
/// Under `Reject` a negative total is an error, not a warning, so none is
/// reported for it here.
pub fn billing_warnings(
    draft: &InvoiceDraft,
    computed: &InvoiceTotals,
    policy: NegativeTotalPolicy,
) -> Vec<BillingWarning> {
    let mut warnings = Vec::new();

    if computed.is_negative() {
        match policy {
            NegativeTotalPolicy::Allow => warnings.push(BillingWarning::NegativeTotal {
                total: computed.total,
            }),
            NegativeTotalPolicy::Clamp => warnings.push(BillingWarning::TotalClamped {
                computed: computed.total,
            }),
            NegativeTotalPolicy::Reject => {}
        }
    }

    if let Some(submitted) = draft.total {
        if submitted != computed.total {
            warnings.push(BillingWarning::ClientTotalIgnored {
                submitted,
                computed: computed.total,
            });
        }
    }

    warnings
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
