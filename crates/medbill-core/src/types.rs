//! # Domain Types
//!
//! Core domain types used throughout MedBill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InvoiceDraft   │   │    Invoice      │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  patient        │──►│  id (UUID)      │   │  description    │       │
//! │  │  line_items     │   │  invoice_no     │   │  quantity       │       │
//! │  │  adjustments    │   │  subtotal       │   │  unit_price     │       │
//! │  │  total (ignored)│   │  total          │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │ PatientSnapshot │   │ NegativeTotalPolicy │                         │
//! │  │  frozen copy of │   │  Allow | Clamp |    │                         │
//! │  │  contact fields │   │  Reject             │                         │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A stored invoice has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `invoice_no`: human-facing sequence number printed on the bill

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Line Item
// =============================================================================

/// One billable row of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    /// Integer in practice, fractional quantities are accepted.
    #[ts(type = "string")]
    pub quantity: Decimal,
    #[ts(type = "string")]
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: impl Into<Decimal>, unit_price: Money) -> Self {
        LineItem {
            description: description.into(),
            quantity: quantity.into(),
            unit_price,
        }
    }

    /// `quantity × unit_price`, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul_quantity(self.quantity)
    }
}

// =============================================================================
// Patient Snapshot
// =============================================================================

/// Patient contact details copied onto the invoice at billing time.
///
/// ## Snapshot Pattern
/// The invoice keeps this copy even if the patient record changes later,
/// so a reprinted bill always shows what was billed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    /// Reference to the patient record (UHID).
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// The unsaved invoice assembled by the billing desk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(flatten)]
    #[ts(flatten)]
    pub patient: PatientSnapshot,

    /// Billing date. The store uses today's date when absent.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    #[serde(default)]
    #[ts(type = "string")]
    pub discount: Money,

    #[serde(default)]
    #[ts(type = "string")]
    pub tax: Money,

    #[serde(default)]
    #[ts(type = "string")]
    pub shipping: Money,

    #[serde(default)]
    pub remarks: String,

    /// Total as shown by the client. Advisory only: the stored total is
    /// always recomputed from the line items and adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub total: Option<Money>,
}

// =============================================================================
// Invoice
// =============================================================================

/// A persisted, numbered, immutable invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_no: i64,
    #[serde(flatten)]
    #[ts(flatten)]
    pub patient: PatientSnapshot,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub line_items: Vec<LineItem>,
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub discount: Money,
    #[ts(type = "string")]
    pub tax: Money,
    #[ts(type = "string")]
    pub shipping: Money,
    /// Authoritative grand total computed at persistence time.
    #[ts(type = "string")]
    pub total: Money,
    pub remarks: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn patient_name(&self) -> &str {
        &self.patient.patient_name
    }

    #[inline]
    pub fn email(&self) -> &str {
        &self.patient.email
    }

    /// Amount still owed. Equal to `total`; no payments are tracked here.
    #[inline]
    pub fn balance_due(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Negative Total Policy
// =============================================================================

/// What to do when the discount exceeds everything billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NegativeTotalPolicy {
    /// Store the negative total and report a warning.
    #[default]
    Allow,
    /// Store zero instead of the negative total.
    Clamp,
    /// Refuse to create the invoice.
    Reject,
}

impl fmt::Display for NegativeTotalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegativeTotalPolicy::Allow => write!(f, "allow"),
            NegativeTotalPolicy::Clamp => write!(f, "clamp"),
            NegativeTotalPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for NegativeTotalPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" | "flag" => Ok(NegativeTotalPolicy::Allow),
            "clamp" | "clamp_to_zero" => Ok(NegativeTotalPolicy::Clamp),
            "reject" => Ok(NegativeTotalPolicy::Reject),
            other => Err(ValidationError::InvalidFormat {
                field: "negative_total_policy".to_string(),
                reason: format!("'{}' is not one of: allow, clamp, reject", other),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
