//! Accumulation of realized sales into the shapes the attainment engine
//! consumes: one `ActualSet` per commercial line, or per seller inside a
//! line. Export lines are excluded before anything is summed, matching the
//! domestic goal sheets.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregation::SENTINEL;
use crate::filters::{is_export_line, is_near_expiry, is_new_product};
use crate::types::{Money, TransactionLine};

/// Realized amounts for one attainment slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActualSet {
    pub total: Money,
    /// Revenue from new-product (IPN) lines within the total
    pub new_product_total: Money,
    /// Revenue moved through near-expiry routes within the total
    pub near_expiry_total: Money,
}

impl ActualSet {
    fn absorb(&mut self, line: &TransactionLine) {
        self.total += line.balance;
        if is_new_product(line) {
            self.new_product_total += line.balance;
        }
        if is_near_expiry(line) {
            self.near_expiry_total += line.balance;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total == Decimal::ZERO
            && self.new_product_total == Decimal::ZERO
            && self.near_expiry_total == Decimal::ZERO
    }
}

fn line_key(line: &TransactionLine) -> String {
    match &line.commercial_line {
        Some(t) if !t.label.trim().is_empty() => t.label.trim().to_uppercase(),
        _ => SENTINEL.to_string(),
    }
}

/// Actuals per commercial line, keyed by the upper-cased line label.
/// Export lines are dropped; zero-amount lines contribute nothing but are
/// harmless either way.
pub fn line_actuals<'a, I>(records: I) -> BTreeMap<String, ActualSet>
where
    I: IntoIterator<Item = &'a TransactionLine>,
{
    let mut out: BTreeMap<String, ActualSet> = BTreeMap::new();
    for line in records {
        if is_export_line(line) {
            continue;
        }
        out.entry(line_key(line)).or_default().absorb(line);
    }
    out
}

/// Actuals per seller within one commercial line, keyed by the seller's id
/// rendered as a string (labels are not unique across the sales force).
/// Lines without a seller fall under the sentinel key.
pub fn seller_actuals<'a, I>(records: I, line_label: &str) -> BTreeMap<String, ActualSet>
where
    I: IntoIterator<Item = &'a TransactionLine>,
{
    let wanted = line_label.trim().to_uppercase();
    let mut out: BTreeMap<String, ActualSet> = BTreeMap::new();
    for line in records {
        if is_export_line(line) || line_key(line) != wanted {
            continue;
        }
        let key = match &line.seller {
            Some(s) => s.id.to_string(),
            None => SENTINEL.to_string(),
        };
        out.entry(key).or_default().absorb(line);
    }
    out
}
