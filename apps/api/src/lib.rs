//! # MedBill API
//!
//! REST server for the clinic billing dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  Dashboard ───► axum Router ───► handlers ───► InvoiceRepository       │
//! │                      │                              │                   │
//! │                      │ State<AppState>              ▼                   │
//! │                      │  • Database               SQLite                 │
//! │                      │  • ApiConfig                                     │
//! │                      ▼                                                  │
//! │              ApiError → { code, message } + status                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables, see [`config`]:
//! - `MEDBILL_HTTP_PORT` - HTTP port (default: 8080)
//! - `MEDBILL_DB_PATH` - SQLite database file
//! - `MEDBILL_CLINIC_NAME` - Header of printed invoices
//! - `MEDBILL_NEGATIVE_TOTAL_POLICY` - `allow`, `clamp` or `reject`

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use medbill_db::Database;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use routes::build_router;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
