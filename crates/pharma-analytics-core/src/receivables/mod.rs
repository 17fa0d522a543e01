//! Receivables analytics: per-invoice calculators (days overdue, moratory
//! interest, DSO, CEI, aging classification) and the roll-up that applies
//! them across a filtered invoice set.

pub mod calculators;
pub mod rollup;

pub use calculators::{aging_bucket, cei, days_overdue, dso, moratory_interest};
pub use rollup::{
    receivables_rollup, AgingSummary, DebtStatus, Debtor, InvoiceDetail, ReceivablesInput,
};
