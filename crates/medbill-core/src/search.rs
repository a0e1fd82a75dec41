//! # Invoice Search
//!
//! Free-text filtering over an already-loaded invoice list.
//!
//! ```text
//! term: "asha"
//!   │
//!   ├── patient name  "Asha Rao"   contains "asha"?  ✓
//!   ├── invoice no    "1"          contains "asha"?
//!   └── email         "a@x.com"    contains "asha"?
//!                                  (any hit → match)
//! ```
//!
//! The billing desk types to search: an empty term shows nothing, not the
//! whole ledger.

use crate::types::Invoice;

/// Returns the invoices whose patient name, invoice number or email contains
/// `term`, ignoring case. Input order is preserved.
///
/// ## Example
/// ```rust,ignore
/// let hits = search(&invoices, "asha");
/// let none = search(&invoices, "   ");
/// assert!(none.is_empty());
/// ```
pub fn search<'a>(invoices: &'a [Invoice], term: &str) -> Vec<&'a Invoice> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    invoices
        .iter()
        .filter(|invoice| matches(invoice, &needle))
        .collect()
}

/// `needle` must already be trimmed and lowercased.
fn matches(invoice: &Invoice, needle: &str) -> bool {
    invoice.patient_name().to_lowercase().contains(needle)
        || invoice.invoice_no.to_string().contains(needle)
        || invoice.email().to_lowercase().contains(needle)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::PatientSnapshot;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn invoice(invoice_no: i64, name: &str, email: &str) -> Invoice {
        Invoice {
            id: format!("id-{}", invoice_no),
            invoice_no,
            patient: PatientSnapshot {
                patient_id: format!("UHID-{}", invoice_no),
                patient_name: name.to_string(),
                address: String::new(),
                phone: String::new(),
                email: email.to_string(),
            },
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            line_items: Vec::new(),
            subtotal: Money::zero(),
            discount: Money::zero(),
            tax: Money::zero(),
            shipping: Money::zero(),
            total: Money::zero(),
            remarks: String::new(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    fn ledger() -> Vec<Invoice> {
        vec![
            invoice(1, "Asha Rao", "a@x.com"),
            invoice(2, "Bala", "b@x.com"),
        ]
    }

    #[test]
    fn test_matches_name_case_insensitively() {
        let invoices = ledger();
        let hits = search(&invoices, "asha");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].invoice_no, 1);

        let hits = search(&invoices, "BALA");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].invoice_no, 2);
    }

    #[test]
    fn test_empty_or_blank_term_returns_nothing() {
        let invoices = ledger();
        assert!(search(&invoices, "").is_empty());
        assert!(search(&invoices, "   \t").is_empty());
        assert!(search(&[], "").is_empty());
    }

    #[test]
    fn test_matches_invoice_number_as_string() {
        let invoices = vec![
            invoice(7, "Chitra", "c@x.com"),
            invoice(17, "Dev", "d@x.com"),
            invoice(20, "Esha", "e@x.com"),
        ];
        let hits: Vec<i64> = search(&invoices, "7").iter().map(|i| i.invoice_no).collect();
        assert_eq!(hits, vec![7, 17]);
    }

    #[test]
    fn test_matches_email_and_ors_fields() {
        let invoices = ledger();
        let hits = search(&invoices, "@X.COM");
        assert_eq!(hits.len(), 2);

        let hits = search(&invoices, "b@");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].patient_name(), "Bala");
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        assert!(search(&ledger(), "zzz").is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let invoices = ledger();
        let first: Vec<i64> = search(&invoices, "a").iter().map(|i| i.invoice_no).collect();
        let second: Vec<i64> = search(&invoices, "a").iter().map(|i| i.invoice_no).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![1, 2]);
    }
}
