//! # HTTP Routes
//!
//! ```text
//! POST /api/invoices                      create from a draft  → 201
//! GET  /api/invoices                      every invoice, by number
//! GET  /api/invoices/search?term=asha     name / number / email match
//! GET  /api/invoices/{invoiceNo}          one invoice          → 404 if absent
//! GET  /api/invoices/{invoiceNo}/print    plain-text print view
//! GET  /health                            "OK" or 503
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use medbill_core::{render_invoice, BillingWarning, Invoice, InvoiceDraft};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/invoices", get(list_invoices).post(create_invoice))
        .route("/api/invoices/search", get(search_invoices))
        .route("/api/invoices/{invoice_no}", get(get_invoice))
        .route("/api/invoices/{invoice_no}/print", get(print_invoice))
        .route("/health", get(health_handler))
        .with_state(state)
}

// =============================================================================
// DTOs
// =============================================================================

/// Body of a successful `POST /api/invoices`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
    pub invoice: Invoice,
    pub warnings: Vec<WarningDto>,
}

/// A billing warning with a display message.
#[derive(Debug, Serialize)]
pub struct WarningDto {
    #[serde(flatten)]
    pub warning: BillingWarning,
    pub message: String,
}

impl From<BillingWarning> for WarningDto {
    fn from(warning: BillingWarning) -> Self {
        WarningDto {
            message: warning.to_string(),
            warning,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub term: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_invoice(
    State(state): State<AppState>,
    body: Result<Json<InvoiceDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateInvoiceResponse>), ApiError> {
    let Json(draft) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    debug!(
        patient_id = %draft.patient.patient_id,
        line_items = draft.line_items.len(),
        "Create invoice request"
    );

    let created = state
        .db
        .invoices()
        .create_invoice_with_warnings(&draft, state.config.negative_total_policy)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInvoiceResponse {
            invoice: created.invoice,
            warnings: created.warnings.into_iter().map(WarningDto::from).collect(),
        }),
    ))
}

async fn list_invoices(State(state): State<AppState>) -> Result<Json<Vec<Invoice>>, ApiError> {
    Ok(Json(state.db.invoices().list_invoices().await?))
}

async fn search_invoices(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    Ok(Json(state.db.invoices().search(&params.term).await?))
}

async fn get_invoice(
    State(state): State<AppState>,
    invoice_no: Result<Path<i64>, PathRejection>,
) -> Result<Json<Invoice>, ApiError> {
    let invoice = find_invoice(&state, invoice_no).await?;
    Ok(Json(invoice))
}

async fn print_invoice(
    State(state): State<AppState>,
    invoice_no: Result<Path<i64>, PathRejection>,
) -> Result<String, ApiError> {
    let invoice = find_invoice(&state, invoice_no).await?;
    Ok(render_invoice(&invoice, &state.config.clinic_name))
}

async fn find_invoice(
    state: &AppState,
    invoice_no: Result<Path<i64>, PathRejection>,
) -> Result<Invoice, ApiError> {
    let Path(invoice_no) = invoice_no.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    state
        .db
        .invoices()
        .get_by_number(invoice_no)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", invoice_no))
}

/// Health check endpoint.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}
