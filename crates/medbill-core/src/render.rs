//! # Print View
//!
//! Plain-text projection of a stored invoice, used by the print endpoint.
//! This is the only place amounts are rounded.

use std::fmt;

use crate::money::Money;
use crate::types::Invoice;

const WIDTH: usize = 64;
const DESCRIPTION_WIDTH: usize = 28;

/// A printable view of an invoice.
///
/// ```rust,ignore
/// let text = InvoicePrint::new(&invoice, "City Care Clinic").to_string();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InvoicePrint<'a> {
    invoice: &'a Invoice,
    clinic_name: &'a str,
}

impl<'a> InvoicePrint<'a> {
    pub fn new(invoice: &'a Invoice, clinic_name: &'a str) -> Self {
        InvoicePrint {
            invoice,
            clinic_name,
        }
    }
}

/// Renders `invoice` as printable text headed by `clinic_name`.
pub fn render_invoice(invoice: &Invoice, clinic_name: &str) -> String {
    InvoicePrint::new(invoice, clinic_name).to_string()
}

impl fmt::Display for InvoicePrint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inv = self.invoice;
        let rule = "-".repeat(WIDTH);

        writeln!(f, "{:^width$}", self.clinic_name.trim(), width = WIDTH)?;
        writeln!(f, "{:^width$}", "INVOICE", width = WIDTH)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<32}{:>32}",
            format!("Invoice No: {}", inv.invoice_no),
            format!("Date: {}", inv.date.format("%Y-%m-%d"))
        )?;
        writeln!(
            f,
            "Patient:  {} ({})",
            inv.patient.patient_name, inv.patient.patient_id
        )?;
        for (label, value) in [
            ("Address:", &inv.patient.address),
            ("Phone:", &inv.patient.phone),
            ("Email:", &inv.patient.email),
        ] {
            if !value.trim().is_empty() {
                writeln!(f, "{:<10}{}", label, value.trim())?;
            }
        }

        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<4}{:<desc$}{:>8}{:>12}{:>12}",
            "#",
            "Description",
            "Qty",
            "Unit Price",
            "Amount",
            desc = DESCRIPTION_WIDTH
        )?;
        for (index, item) in inv.line_items.iter().enumerate() {
            let amount = item
                .line_total()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<4}{:<desc$}{:>8}{:>12}{:>12}",
                index + 1,
                truncate(&item.description, DESCRIPTION_WIDTH - 1),
                item.quantity.normalize().to_string(),
                item.unit_price.to_string(),
                amount,
                desc = DESCRIPTION_WIDTH
            )?;
        }
        writeln!(f, "{}", rule)?;

        total_line(f, "Subtotal:", inv.subtotal)?;
        total_line(f, "Discount:", -inv.discount)?;
        total_line(f, "Tax:", inv.tax)?;
        total_line(f, "Shipping:", inv.shipping)?;
        total_line(f, "Balance due:", inv.balance_due())?;

        if !inv.remarks.trim().is_empty() {
            writeln!(f, "{}", rule)?;
            writeln!(f, "Remarks: {}", inv.remarks.trim())?;
        }

        Ok(())
    }
}

fn total_line(f: &mut fmt::Formatter<'_>, label: &str, amount: Money) -> fmt::Result {
    writeln!(f, "{:>50}{:>14}", label, amount.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// =============================================================================
// Unit Tests
// =============================================================================
