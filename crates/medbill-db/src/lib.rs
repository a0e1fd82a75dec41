//! # medbill-db: Database Layer for MedBill
//!
//! This crate persists invoices in SQLite using sqlx for async operations,
//! and hands out gap-free, strictly increasing invoice numbers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MedBill Data Flow                                │
//! │                                                                         │
//! │  POST /api/invoices (medbill-api)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    medbill-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (invoice.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ InvoiceRepo   │    │ 001_init.sql │  │   │
//! │  │   │ WAL + busy    │    │ counter row   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │      invoice_counter · invoices · invoice_line_items            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Invoice repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medbill_core::NegativeTotalPolicy;
//! use medbill_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("medbill.db")).await?;
//!
//! let invoice = db.invoices().create_invoice(&draft, NegativeTotalPolicy::Allow).await?;
//! let matches = db.invoices().search("asha").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::{migration_status, MigrationStatus};
pub use pool::{Database, DbConfig};

pub use repository::invoice::{CreatedInvoice, InvoiceRepository};
