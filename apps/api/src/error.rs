//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in MedBill                                │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──► DbError::Rejected ──┐               │
//! │                                                        │               │
//! │  sqlx::Error ─────────────────────► DbError ───────────┤               │
//! │                                                        ▼               │
//! │                                                    ApiError            │
//! │                                                        │               │
//! │  HTTP status + JSON body { code, message, ... } ◄──────┘               │
//! │                                                                         │
//! │  VALIDATION_ERROR  400    bad draft, bad body, bad path                │
//! │  BUSINESS_RULE     422    negative total under the reject policy       │
//! │  NOT_FOUND         404    no invoice with that number                  │
//! │  DATABASE_ERROR    503    retryable persistence failure                │
//! │  DATABASE_ERROR    500    anything else the store reports              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medbill_core::{CoreError, ValidationError};
use medbill_db::DbError;
use serde::Serialize;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Validation error: lineItems[0].quantity must not be negative",
///   "field": "lineItems[0].quantity",
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Offending input field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Whether repeating the request may succeed
    pub retryable: bool,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Billing rule refused the request (422)
    BusinessRule,

    /// Resource not found (404)
    NotFound,

    /// Persistence failed (503 if retryable, else 500)
    DatabaseError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
            retryable: false,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    fn database(message: impl Into<String>, retryable: bool) -> Self {
        ApiError {
            retryable,
            ..ApiError::new(ErrorCode::DatabaseError, message)
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError if self.retryable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError {
            field: Some(err.field().to_string()),
            ..ApiError::validation(CoreError::from(err).to_string())
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::from(e),
            e @ CoreError::NegativeTotal { .. } => {
                ApiError::new(ErrorCode::BusinessRule, e.to_string())
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let retryable = err.is_retryable();
        match err {
            DbError::Rejected(e) => ApiError::from(e),
            DbError::UniqueViolation { field, .. } => {
                tracing::error!(%field, "Unique constraint violated");
                ApiError::database("Invoice could not be saved", retryable)
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::database("Database connection failed", retryable)
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::database("Database operation failed", retryable)
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::database("Database transaction failed", retryable)
            }
            DbError::WriteFailed { invoice_no, source } => {
                tracing::error!(invoice_no, "Invoice write failed: {}", source);
                ApiError::database("Invoice could not be saved, try again", retryable)
            }
            DbError::PoolExhausted => {
                ApiError::database("Database is busy, try again", retryable)
            }
            DbError::CorruptRecord { column, reason } => {
                tracing::error!(%column, %reason, "Stored invoice could not be decoded");
                ApiError::database("Stored invoice could not be read", retryable)
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::database("Database operation failed", retryable)
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::database("Database migration failed", retryable)
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::database("Database operation failed", retryable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbill_core::Money;

    #[test]
    fn test_validation_maps_to_400_with_field() {
        let err = ApiError::from(DbError::Rejected(CoreError::Validation(
            ValidationError::MustNotBeNegative {
                field: "lineItems[0].quantity".to_string(),
            },
        )));

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("lineItems[0].quantity"));
        assert!(!err.retryable);
    }

    #[test]
    fn test_negative_total_maps_to_422() {
        let err = ApiError::from(CoreError::NegativeTotal {
            total: Money::from(-10),
        });
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_database_errors_split_on_retryability() {
        let busy = ApiError::from(DbError::PoolExhausted);
        assert_eq!(busy.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(busy.retryable);

        let write = ApiError::from(DbError::WriteFailed {
            invoice_no: 2,
            source: Box::new(DbError::UniqueViolation {
                field: "invoices.invoice_no".to_string(),
                value: "unknown".to_string(),
            }),
        });
        assert_eq!(write.code, ErrorCode::DatabaseError);
        assert_eq!(write.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(write.retryable);

        let corrupt = ApiError::from(DbError::corrupt("total", "bad digit"));
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!corrupt.retryable);
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ApiError::not_found("Invoice", 7)).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Invoice not found: 7");
        assert!(json.get("field").is_none());
    }
}
