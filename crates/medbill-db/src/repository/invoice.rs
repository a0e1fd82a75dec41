//! # Invoice Repository
//!
//! Persistence for invoices and their line items, including invoice number
//! allocation.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_invoice(draft, policy)                     │
//! │                                                                         │
//! │  1. VALIDATE + TOTAL (medbill-core, no I/O)                            │
//! │     └── patient, remarks, line items, adjustments                      │
//! │     └── compute_total() → apply_policy()                               │
//! │     └── failure → DbError::Rejected, nothing allocated                 │
//! │                                                                         │
//! │  2. ALLOCATE NUMBER (own statement, autocommit)                        │
//! │     └── UPDATE invoice_counter SET last_value = last_value + 1         │
//! │         WHERE id = 1 RETURNING last_value                              │
//! │                                                                         │
//! │  3. WRITE (one transaction)                                            │
//! │     └── INSERT invoices                                                │
//! │     └── INSERT invoice_line_items × n  (position 0..n)                 │
//! │     └── failure → rollback, number stays unused (a hole)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a counter row
//! Two desks saving at once must never get the same number. SQLite takes the
//! write lock for the single UPDATE statement, so increments serialize no
//! matter how many pool connections race. Reading `MAX(invoice_no)` and adding
//! one would let both desks read the same maximum.
//!
//! Money and quantities are stored as decimal TEXT and parsed back exactly;
//! a value that no longer parses is reported as [`DbError::CorruptRecord`].

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use medbill_core::validation::validate_draft_envelope;
use medbill_core::{
    billing_warnings, compute_draft_totals, search, BillingWarning, CoreError, Invoice,
    InvoiceDraft, LineItem, Money, NegativeTotalPolicy, PatientSnapshot,
};

const INVOICE_COLUMNS: &str = r#"
    id, invoice_no,
    patient_id, patient_name, address, phone, email,
    invoice_date, subtotal, discount, tax, shipping, total,
    remarks, created_at
"#;

// =============================================================================
// Result Types
// =============================================================================

/// A freshly stored invoice plus anything the billing desk should be told.
#[derive(Debug, Clone)]
pub struct CreatedInvoice {
    pub invoice: Invoice,
    pub warnings: Vec<BillingWarning>,
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    invoice_no: i64,
    patient_id: String,
    patient_name: String,
    address: String,
    phone: String,
    email: String,
    invoice_date: NaiveDate,
    subtotal: String,
    discount: String,
    tax: String,
    shipping: String,
    total: String,
    remarks: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    invoice_id: String,
    description: String,
    quantity: String,
    unit_price: String,
}

impl InvoiceRow {
    fn into_invoice(self, line_items: Vec<LineItem>) -> DbResult<Invoice> {
        Ok(Invoice {
            subtotal: parse_money("subtotal", &self.subtotal)?,
            discount: parse_money("discount", &self.discount)?,
            tax: parse_money("tax", &self.tax)?,
            shipping: parse_money("shipping", &self.shipping)?,
            total: parse_money("total", &self.total)?,
            id: self.id,
            invoice_no: self.invoice_no,
            patient: PatientSnapshot {
                patient_id: self.patient_id,
                patient_name: self.patient_name,
                address: self.address,
                phone: self.phone,
                email: self.email,
            },
            date: self.invoice_date,
            line_items,
            remarks: self.remarks,
            created_at: self.created_at,
        })
    }
}

impl LineItemRow {
    fn into_line_item(self) -> DbResult<LineItem> {
        Ok(LineItem {
            quantity: parse_decimal("quantity", &self.quantity)?,
            unit_price: parse_money("unit_price", &self.unit_price)?,
            description: self.description,
        })
    }
}

fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| DbError::corrupt(column, format!("'{}': {}", raw, e)))
}

fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    parse_decimal(column, raw).map(Money::new)
}

/// Exact decimal text, never rounded (`Money`'s `Display` rounds).
fn money_text(amount: Money) -> String {
    amount.amount().to_string()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Validates, numbers and stores a draft invoice.
    ///
    /// The stored total is always recomputed; `draft.total` is ignored.
    ///
    /// ## Errors
    /// * `DbError::Rejected` - invalid draft, or negative total under
    ///   `NegativeTotalPolicy::Reject`. No number is consumed.
    /// * any other `DbError` - the write failed after a number was allocated;
    ///   that number is skipped.
    pub async fn create_invoice(
        &self,
        draft: &InvoiceDraft,
        policy: NegativeTotalPolicy,
    ) -> DbResult<Invoice> {
        Ok(self.create_invoice_with_warnings(draft, policy).await?.invoice)
    }

    /// Same as [`create_invoice`](Self::create_invoice), also returning the
    /// billing warnings (negative or clamped total, ignored client total).
    pub async fn create_invoice_with_warnings(
        &self,
        draft: &InvoiceDraft,
        policy: NegativeTotalPolicy,
    ) -> DbResult<CreatedInvoice> {
        validate_draft_envelope(draft).map_err(CoreError::from)?;
        let computed = compute_draft_totals(draft).map_err(CoreError::from)?;
        let totals = computed.apply_policy(policy)?;

        let warnings = billing_warnings(draft, &computed, policy);
        for warning in &warnings {
            warn!(
                patient_id = %draft.patient.patient_id,
                policy = %policy,
                "{}", warning
            );
        }

        let invoice_no = self.allocate_invoice_no().await?;

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_no,
            patient: trimmed(&draft.patient),
            date: draft.date.unwrap_or_else(|| Utc::now().date_naive()),
            line_items: draft.line_items.clone(),
            subtotal: totals.subtotal,
            discount: totals.discount,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            remarks: draft.remarks.trim().to_string(),
            created_at: Utc::now().trunc_subsecs(3),
        };

        if let Err(err) = self.insert_invoice(&invoice).await {
            error!(
                invoice_no,
                error = %err,
                "Invoice write failed, number skipped"
            );
            return Err(DbError::WriteFailed {
                invoice_no,
                source: Box::new(err),
            });
        }

        info!(
            invoice_no,
            id = %invoice.id,
            patient_id = %invoice.patient.patient_id,
            line_items = invoice.line_items.len(),
            total = %money_text(invoice.total),
            "Invoice created"
        );

        Ok(CreatedInvoice { invoice, warnings })
    }

    /// Takes the next invoice number.
    async fn allocate_invoice_no(&self) -> DbResult<i64> {
        let invoice_no: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE invoice_counter
            SET last_value = last_value + 1
            WHERE id = 1
            RETURNING last_value
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let invoice_no =
            invoice_no.ok_or_else(|| DbError::Internal("invoice counter row is missing".to_string()))?;

        debug!(invoice_no, "Allocated invoice number");
        Ok(invoice_no)
    }

    /// Writes the invoice and its line items atomically.
    async fn insert_invoice(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, invoice_no = invoice.invoice_no, "Inserting invoice");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_no,
                patient_id, patient_name, address, phone, email,
                invoice_date, subtotal, discount, tax, shipping, total,
                remarks, created_at
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(invoice.invoice_no)
        .bind(&invoice.patient.patient_id)
        .bind(&invoice.patient.patient_name)
        .bind(&invoice.patient.address)
        .bind(&invoice.patient.phone)
        .bind(&invoice.patient.email)
        .bind(invoice.date)
        .bind(money_text(invoice.subtotal))
        .bind(money_text(invoice.discount))
        .bind(money_text(invoice.tax))
        .bind(money_text(invoice.shipping))
        .bind(money_text(invoice.total))
        .bind(&invoice.remarks)
        .bind(invoice.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in invoice.line_items.iter().enumerate() {
            let line_total = item.line_total().ok_or_else(|| {
                DbError::Internal(format!("line item {} overflowed after validation", position))
            })?;

            sqlx::query(
                r#"
                INSERT INTO invoice_line_items (
                    id, invoice_id, position,
                    description, quantity, unit_price, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&invoice.id)
            .bind(position as i64)
            .bind(&item.description)
            .bind(item.quantity.to_string())
            .bind(money_text(item.unit_price))
            .bind(money_text(line_total))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Returns every stored invoice, ordered by invoice number.
    pub async fn list_invoices(&self) -> DbResult<Vec<Invoice>> {
        debug!("Listing invoices");

        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices ORDER BY invoice_no ASC",
            INVOICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        // Loaded after the invoices: any invoice listed above was committed
        // together with its items, so none are missing here.
        let item_rows: Vec<LineItemRow> = sqlx::query_as(
            r#"
            SELECT invoice_id, description, quantity, unit_price
            FROM invoice_line_items
            ORDER BY invoice_id, position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_invoice: HashMap<String, Vec<LineItem>> = HashMap::new();
        for row in item_rows {
            let invoice_id = row.invoice_id.clone();
            items_by_invoice
                .entry(invoice_id)
                .or_default()
                .push(row.into_line_item()?);
        }

        rows.into_iter()
            .map(|row| {
                let items = items_by_invoice.remove(&row.id).unwrap_or_default();
                row.into_invoice(items)
            })
            .collect()
    }

    /// Looks up an invoice by its printed number.
    ///
    /// ## Returns
    /// * `Ok(Some(invoice))` - found
    /// * `Ok(None)` - no invoice has that number
    pub async fn get_by_number(&self, invoice_no: i64) -> DbResult<Option<Invoice>> {
        debug!(invoice_no, "Fetching invoice by number");

        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM invoices WHERE invoice_no = ?1",
            INVOICE_COLUMNS
        ))
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.line_items(&row.id).await?;
        row.into_invoice(items).map(Some)
    }

    async fn line_items(&self, invoice_id: &str) -> DbResult<Vec<LineItem>> {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            r#"
            SELECT invoice_id, description, quantity, unit_price
            FROM invoice_line_items
            WHERE invoice_id = ?1
            ORDER BY position ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LineItemRow::into_line_item).collect()
    }

    /// Searches invoices by patient name, invoice number or email.
    ///
    /// An empty or whitespace-only term returns no invoices. No term is
    /// rejected; one that matches nothing yields an empty list.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Invoice>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        debug!(term = %term, "Searching invoices");

        let invoices = self.list_invoices().await?;
        Ok(search(&invoices, term).into_iter().cloned().collect())
    }

    /// Counts stored invoices (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// The last number handed out, including skipped ones.
    pub async fn last_allocated_number(&self) -> DbResult<i64> {
        let last: i64 = sqlx::query_scalar("SELECT last_value FROM invoice_counter WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(last)
    }
}

fn trimmed(patient: &PatientSnapshot) -> PatientSnapshot {
    PatientSnapshot {
        patient_id: patient.patient_id.trim().to_string(),
        patient_name: patient.patient_name.trim().to_string(),
        address: patient.address.trim().to_string(),
        phone: patient.phone.trim().to_string(),
        email: patient.email.trim().to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use medbill_core::{compute_total, ValidationError};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn patient(id: &str, name: &str, email: &str) -> PatientSnapshot {
        PatientSnapshot {
            patient_id: id.to_string(),
            patient_name: name.to_string(),
            address: "12 MG Road".to_string(),
            phone: "9876543210".to_string(),
            email: email.to_string(),
        }
    }

    fn consultation_draft(patient: PatientSnapshot) -> InvoiceDraft {
        InvoiceDraft {
            patient,
            date: NaiveDate::from_ymd_opt(2026, 3, 1),
            line_items: vec![
                LineItem::new("Consultation", 1, money("500")),
                LineItem::new("Lab test", 2, money("150")),
            ],
            discount: money("50"),
            tax: money("20"),
            shipping: Money::zero(),
            remarks: "Review in two weeks".to_string(),
            total: None,
        }
    }

    fn asha() -> InvoiceDraft {
        consultation_draft(patient("UHID-0001", "Asha Rao", "a@x.com"))
    }

    fn ravi() -> InvoiceDraft {
        consultation_draft(patient("UHID-0002", "Ravi Kumar", "ravi@clinic.org"))
    }

    #[tokio::test]
    async fn test_create_computes_totals_and_round_trips() {
        let db = setup().await;
        let repo = db.invoices();

        let created = repo
            .create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();

        assert_eq!(created.invoice_no, 1);
        assert_eq!(created.subtotal, money("800"));
        assert_eq!(created.total, money("770"));

        let listed = repo.list_invoices().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);

        let expected = compute_total(
            &listed[0].line_items,
            listed[0].discount,
            listed[0].tax,
            listed[0].shipping,
        )
        .unwrap();
        assert_eq!(listed[0].total, expected.total);
        assert_eq!(listed[0].line_items[1].description, "Lab test");
    }

    #[tokio::test]
    async fn test_numbers_are_sequential() {
        let db = setup().await;
        let repo = db.invoices();

        for expected in 1..=3 {
            let invoice = repo
                .create_invoice(&asha(), NegativeTotalPolicy::Allow)
                .await
                .unwrap();
            assert_eq!(invoice.invoice_no, expected);
        }

        let numbers: Vec<i64> = repo
            .list_invoices()
            .await
            .unwrap()
            .iter()
            .map(|i| i.invoice_no)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_invalid_draft_consumes_no_number() {
        let db = setup().await;
        let repo = db.invoices();

        let mut bad = asha();
        bad.line_items[0].quantity = Decimal::from(-1);

        let err = repo
            .create_invoice(&bad, NegativeTotalPolicy::Allow)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::Validation(ValidationError::MustNotBeNegative { ref field }))
                if field == "lineItems[0].quantity"
        ));

        let mut nameless = asha();
        nameless.patient.patient_name = "   ".to_string();
        assert!(matches!(
            repo.create_invoice(&nameless, NegativeTotalPolicy::Allow).await,
            Err(DbError::Rejected(_))
        ));

        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.last_allocated_number().await.unwrap(), 0);

        let ok = repo
            .create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        assert_eq!(ok.invoice_no, 1);
    }

    #[tokio::test]
    async fn test_negative_total_policies() {
        let db = setup().await;
        let repo = db.invoices();

        let mut draft = asha();
        draft.discount = money("1000");

        let allowed = repo
            .create_invoice_with_warnings(&draft, NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        assert_eq!(allowed.invoice.total, money("-180"));
        assert!(matches!(
            allowed.warnings[..],
            [BillingWarning::NegativeTotal { .. }]
        ));

        let clamped = repo
            .create_invoice_with_warnings(&draft, NegativeTotalPolicy::Clamp)
            .await
            .unwrap();
        assert_eq!(clamped.invoice.total, Money::zero());
        assert_eq!(clamped.invoice.subtotal, money("800"));

        let rejected = repo
            .create_invoice(&draft, NegativeTotalPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(
            rejected,
            DbError::Rejected(CoreError::NegativeTotal { .. })
        ));

        assert_eq!(repo.last_allocated_number().await.unwrap(), 2);
        let stored = repo.get_by_number(1).await.unwrap().unwrap();
        assert_eq!(stored.total, money("-180"));
    }

    #[tokio::test]
    async fn test_client_total_is_ignored() {
        let db = setup().await;
        let repo = db.invoices();

        let mut draft = asha();
        draft.total = Some(money("1"));

        let created = repo
            .create_invoice_with_warnings(&draft, NegativeTotalPolicy::Allow)
            .await
            .unwrap();

        assert_eq!(created.invoice.total, money("770"));
        assert_eq!(
            created.warnings,
            vec![BillingWarning::ClientTotalIgnored {
                submitted: money("1"),
                computed: money("770"),
            }]
        );
    }

    #[tokio::test]
    async fn test_fractional_amounts_are_stored_exactly() {
        let db = setup().await;
        let repo = db.invoices();

        let mut draft = asha();
        draft.line_items = vec![
            LineItem::new("Saline", Decimal::new(15, 1), money("150.005")),
            LineItem::new("Gauze", 3, money("0.333")),
        ];
        draft.discount = Money::zero();
        draft.tax = money("0.001");

        let created = repo
            .create_invoice(&draft, NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        // 1.5 × 150.005 = 225.0075, 3 × 0.333 = 0.999
        assert_eq!(created.subtotal, money("226.0065"));
        assert_eq!(created.total, money("226.0075"));

        let stored = repo.get_by_number(created.invoice_no).await.unwrap().unwrap();
        assert_eq!(stored.total.amount(), Decimal::from_str("226.0075").unwrap());
        assert_eq!(stored.line_items[0].quantity, Decimal::new(15, 1));
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_get_by_number_absent_is_none() {
        let db = setup().await;
        let repo = db.invoices();

        assert!(repo.get_by_number(1).await.unwrap().is_none());

        repo.create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        assert!(repo.get_by_number(1).await.unwrap().is_some());
        assert!(repo.get_by_number(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_by_name_number_and_email() {
        let db = setup().await;
        let repo = db.invoices();

        repo.create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        repo.create_invoice(&ravi(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();

        let hits = repo.search("asha").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].invoice_no, 1);

        let hits = repo.search("2").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].patient_name(), "Ravi Kumar");

        let hits = repo.search("CLINIC.ORG").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].invoice_no, 2);

        assert!(repo.search("").await.unwrap().is_empty());
        assert!(repo.search("   ").await.unwrap().is_empty());
        assert!(repo.search("nobody").await.unwrap().is_empty());

        let long_term = "x".repeat(500);
        assert!(repo.search(&long_term).await.unwrap().is_empty());

        let full_email = format!("  {}  ", ravi().patient.email);
        let hits = repo.search(&full_email).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_date_defaults_to_today() {
        let db = setup().await;
        let repo = db.invoices();

        let mut draft = asha();
        draft.date = None;

        let before = Utc::now().date_naive();
        let created = repo
            .create_invoice(&draft, NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        let after = Utc::now().date_naive();

        assert!(created.date >= before && created.date <= after);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_a_hole() {
        let db = setup().await;
        let repo = db.invoices();

        repo.create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();

        // Occupy number 2 behind the counter's back so the next insert fails.
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_no, patient_id, patient_name,
                invoice_date, subtotal, discount, tax, shipping, total, created_at
            ) VALUES ('squatter', 2, 'X', 'X', '2026-03-01', '0', '0', '0', '0', '0', '2026-03-01T00:00:00Z')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo
            .create_invoice(&ravi(), NegativeTotalPolicy::Allow)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        match err {
            DbError::WriteFailed { invoice_no, source } => {
                assert_eq!(invoice_no, 2);
                assert!(matches!(*source, DbError::UniqueViolation { .. }));
            }
            other => panic!("expected WriteFailed, got {:?}", other),
        }

        // The failed attempt left no line items behind.
        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM invoice_line_items WHERE invoice_id NOT IN (SELECT id FROM invoices)",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(orphans, 0);

        let next = repo
            .create_invoice(&ravi(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        assert_eq!(next.invoice_no, 3);
        assert_eq!(repo.last_allocated_number().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_on_closed_store_is_retryable() {
        let db = setup().await;
        let repo = db.invoices();
        db.close().await;

        let err = repo
            .create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_corrupt_amount_is_reported() {
        let db = setup().await;
        let repo = db.invoices();

        repo.create_invoice(&asha(), NegativeTotalPolicy::Allow)
            .await
            .unwrap();
        sqlx::query("UPDATE invoices SET total = 'seven hundred' WHERE invoice_no = 1")
            .execute(db.pool())
            .await
            .unwrap();

        let err = repo.list_invoices().await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord { ref column, .. } if column == "total"));
    }

    /// Many desks saving at once must get distinct, consecutive numbers.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_consecutive_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("medbill.db")).max_connections(5))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = db.invoices();
            let draft = consultation_draft(patient(
                &format!("UHID-{:04}", i),
                &format!("Patient {}", i),
                "",
            ));
            handles.push(tokio::spawn(async move {
                repo.create_invoice(&draft, NegativeTotalPolicy::Allow).await
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().invoice_no);
        }
        numbers.sort_unstable();

        assert_eq!(numbers, (1..=20).collect::<Vec<i64>>());
        assert_eq!(db.invoices().count().await.unwrap(), 20);

        db.close().await;
    }
}
