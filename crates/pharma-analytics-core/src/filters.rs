//! Domain predicates applied before aggregation.
//!
//! The exclusion policy (export lines out of the domestic dashboards,
//! country != PE means international receivables) lives here in one place
//! so every report applies the same rules.

use crate::types::{InvoiceRecord, LifeCycle, TagRef, TransactionLine};

/// Label substrings that mark an export (international sale) line or channel.
const EXPORT_MARKERS: [&str; 2] = ["VENTA INTERNACIONAL", "INTERNACIONAL"];

/// Country code of domestic customers; everything else is international.
pub const DOMESTIC_COUNTRY: &str = "PE";

/// Logistics route ids that flag near-expiry stock movements.
pub const NEAR_EXPIRY_ROUTE_IDS: [i64; 2] = [18, 19];

fn label_is_export(tag: &Option<TagRef>) -> bool {
    match tag {
        Some(t) => {
            let upper = t.label.to_uppercase();
            EXPORT_MARKERS.iter().any(|m| upper.contains(m))
        }
        None => false,
    }
}

/// True when the line belongs to the export business (international sale),
/// judged by its commercial line or sales channel label.
pub fn is_export_line(line: &TransactionLine) -> bool {
    label_is_export(&line.commercial_line) || label_is_export(&line.sales_channel)
}

/// Lines kept by the domestic dashboards.
pub fn domestic_lines(lines: &[TransactionLine]) -> Vec<&TransactionLine> {
    lines.iter().filter(|l| !is_export_line(l)).collect()
}

/// Lines belonging to the export business.
pub fn export_lines(lines: &[TransactionLine]) -> Vec<&TransactionLine> {
    lines.iter().filter(|l| is_export_line(l)).collect()
}

/// True when the line moved near-expiry stock (flagged via its route).
pub fn is_near_expiry(line: &TransactionLine) -> bool {
    line.delivery_route
        .as_ref()
        .map(|r| NEAR_EXPIRY_ROUTE_IDS.contains(&r.id))
        .unwrap_or(false)
}

/// True for new-product (IPN) lines.
pub fn is_new_product(line: &TransactionLine) -> bool {
    line.life_cycle == LifeCycle::New
}

/// True when the invoice belongs to international collections: export marker
/// on its channel or commercial line, or a customer country other than PE.
pub fn is_international_invoice(inv: &InvoiceRecord) -> bool {
    if label_is_export(&inv.sales_channel) || label_is_export(&inv.commercial_line) {
        return true;
    }
    match inv.country_code.as_deref() {
        Some(code) => !code.is_empty() && code != DOMESTIC_COUNTRY,
        None => false,
    }
}

pub fn international_invoices(invoices: &[InvoiceRecord]) -> Vec<&InvoiceRecord> {
    invoices.iter().filter(|i| is_international_invoice(i)).collect()
}

pub fn domestic_invoices(invoices: &[InvoiceRecord]) -> Vec<&InvoiceRecord> {
    invoices.iter().filter(|i| !is_international_invoice(i)).collect()
}
