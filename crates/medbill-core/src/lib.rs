//! # medbill-core: Pure Billing Logic for MedBill
//!
//! This crate is the **heart** of the clinic billing system. It contains the
//! invoice arithmetic, validation and search as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MedBill Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Admin Dashboard (React)                         │   │
//! │  │    Billing form ──► Print view ──► Invoice search              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    medbill-api (axum)                           │   │
//! │  │    POST /api/invoices, GET /api/invoices/search, ...           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ medbill-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  totals   │  │  search   │  │   │
//! │  │   │  Invoice  │  │   Money   │  │ aggregator│  │  render   │  │   │
//! │  │   │ LineItem  │  │ (decimal) │  │           │  │validation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  medbill-db (Database Layer)                    │   │
//! │  │        SQLite invoice store, atomic invoice numbering           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Invoice, LineItem, PatientSnapshot, ...)
//! - [`money`] - Exact decimal money
//! - [`totals`] - Invoice total aggregation
//! - [`search`] - Free-text invoice search
//! - [`render`] - Printable invoice text
//! - [`validation`] - Draft validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use medbill_core::money::Money;
//! use medbill_core::totals::compute_total;
//! use medbill_core::types::LineItem;
//!
//! let items = [
//!     LineItem::new("Consultation", 1, Money::from(500)),
//!     LineItem::new("Lab test", 2, Money::from(150)),
//! ];
//!
//! let totals = compute_total(&items, Money::from(50), Money::from(20), Money::zero()).unwrap();
//! assert_eq!(totals.total.to_string(), "770.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod render;
pub mod search;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use render::render_invoice;
pub use search::search;
pub use totals::{billing_warnings, compute_draft_totals, compute_total, BillingWarning, InvoiceTotals};
pub use types::*;

// =============================================================================
// Crate-Level Limits
// =============================================================================

/// Maximum line items on a single invoice.
pub const MAX_LINE_ITEMS: usize = 1000;

pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_PATIENT_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_PHONE_LEN: usize = 32;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_REMARKS_LEN: usize = 2000;
