//! # Repository Module
//!
//! Database repository implementations for MedBill.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.invoices().create_invoice(&draft, policy)                  │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── create_invoice(&self, draft, policy)                              │
//! │  ├── list_invoices(&self)                                              │
//! │  ├── get_by_number(&self, invoice_no)                                  │
//! │  ├── search(&self, term)                                               │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       │  SQL                                                           │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod invoice;
