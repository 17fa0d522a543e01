//! Receivables roll-up: applies the calculators across an invoice set to
//! produce aging-bucket totals, per-country DSO, accrued moratory interest
//! and a top-N debtor ranking.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::AnalyticsError;
use crate::receivables::calculators::{aging_bucket, days_overdue, dso, moratory_interest};
use crate::types::{
    with_metadata, AgingBucket, ComputationOutput, InvoiceRecord, Money, PaymentState, Rate,
};
use crate::AnalyticsResult;

/// Parameters for one receivables roll-up pass.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivablesInput {
    /// Reference date for days-overdue computation
    pub as_of: NaiveDate,
    /// Length in days of the sales period backing the DSO ratio
    pub period_days: u32,
    /// Annual moratory interest rate as a decimal (0.12 = 12%)
    pub annual_moratory_rate: Rate,
    /// How many debtors to keep in the ranking
    pub top_debtors: usize,
}

/// Whether an invoice is past its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Current,
    Overdue,
}

/// One ranked debtor with its outstanding balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Debtor {
    pub customer: String,
    pub outstanding: Money,
}

/// Per-invoice detail row for drill-down tables.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub document: String,
    pub customer: String,
    pub days_overdue: i64,
    pub bucket: AgingBucket,
    pub outstanding: Money,
    pub accrued_interest: Money,
    pub status: DebtStatus,
}

/// Aggregate receivables picture for one invoice set.
#[derive(Debug, Clone, Serialize)]
pub struct AgingSummary {
    /// Outstanding balance per aging bucket; every bucket present, zero
    /// when empty
    pub buckets: BTreeMap<AgingBucket, Money>,
    pub dso_by_country: BTreeMap<String, Decimal>,
    pub dso_overall: Decimal,
    /// Debtors descending by outstanding balance; non-positive balances
    /// (credits/adjustments) never appear
    pub top_debtors: Vec<Debtor>,
    pub total_outstanding: Money,
    pub overdue_amount: Money,
    pub current_amount: Money,
    pub pct_overdue: Decimal,
    pub avg_days_overdue: Decimal,
    pub accrued_interest: Money,
    pub invoice_count: usize,
    pub payment_state_counts: BTreeMap<PaymentState, usize>,
    pub details: Vec<InvoiceDetail>,
}

fn customer_name(inv: &InvoiceRecord) -> String {
    match &inv.customer {
        Some(c) if !c.label.trim().is_empty() => c.label.trim().to_string(),
        _ => inv.document.clone(),
    }
}

fn country_key(inv: &InvoiceRecord) -> String {
    match inv.country_code.as_deref() {
        Some(code) if !code.trim().is_empty() => code.trim().to_uppercase(),
        _ => "N/A".to_string(),
    }
}

/// Roll the calculators across `invoices`.
///
/// Aging, interest and the debtor ranking consider only invoices with a
/// positive residual; the per-country DSO ratio accumulates residuals and
/// originating sales across the whole set so collected invoices still
/// contribute their sales to the denominator.
pub fn receivables_rollup(
    invoices: &[InvoiceRecord],
    input: &ReceivablesInput,
) -> AnalyticsResult<ComputationOutput<AgingSummary>> {
    let start = Instant::now();

    if input.annual_moratory_rate < Decimal::ZERO {
        return Err(AnalyticsError::InvalidInput {
            field: "annual_moratory_rate".to_string(),
            reason: "rate must be non-negative".to_string(),
        });
    }
    if input.period_days == 0 {
        return Err(AnalyticsError::InvalidInput {
            field: "period_days".to_string(),
            reason: "period must span at least one day".to_string(),
        });
    }
    if input.top_debtors == 0 {
        return Err(AnalyticsError::InvalidInput {
            field: "top_debtors".to_string(),
            reason: "ranking size must be at least 1".to_string(),
        });
    }

    let mut warnings = Vec::new();

    let mut buckets: BTreeMap<AgingBucket, Money> = AgingBucket::ALL
        .iter()
        .map(|b| (*b, Decimal::ZERO))
        .collect();
    let mut by_country: BTreeMap<String, (Money, Money)> = BTreeMap::new();
    let mut by_debtor: BTreeMap<String, Money> = BTreeMap::new();
    let mut details = Vec::new();
    let mut payment_state_counts: BTreeMap<PaymentState, usize> = BTreeMap::new();

    let mut total_outstanding = Decimal::ZERO;
    let mut overdue_amount = Decimal::ZERO;
    let mut accrued_interest = Decimal::ZERO;
    let mut total_sales = Decimal::ZERO;
    let mut overdue_days_sum: i64 = 0;
    let mut overdue_count: usize = 0;
    let mut missing_due_dates: usize = 0;

    for inv in invoices {
        *payment_state_counts.entry(inv.payment_state).or_insert(0) += 1;

        // DSO accumulates over the whole set, settled invoices included
        let country = by_country.entry(country_key(inv)).or_insert((
            Decimal::ZERO,
            Decimal::ZERO,
        ));
        country.0 += inv.amount_residual;
        country.1 += inv.amount_total;
        total_sales += inv.amount_total;

        if inv.amount_residual <= Decimal::ZERO {
            continue;
        }

        if inv.due_date.is_none() {
            missing_due_dates += 1;
        }
        let days = days_overdue(inv.due_date, input.as_of);
        let bucket = aging_bucket(days);
        let interest =
            moratory_interest(days, input.annual_moratory_rate, inv.amount_residual);

        // bucket map is pre-seeded with every variant
        *buckets.get_mut(&bucket).unwrap() += inv.amount_residual;
        total_outstanding += inv.amount_residual;
        accrued_interest += interest;

        let status = if days > 0 {
            overdue_amount += inv.amount_residual;
            overdue_days_sum += days;
            overdue_count += 1;
            DebtStatus::Overdue
        } else {
            DebtStatus::Current
        };

        *by_debtor.entry(customer_name(inv)).or_insert(Decimal::ZERO) +=
            inv.amount_residual;

        details.push(InvoiceDetail {
            document: inv.document.clone(),
            customer: customer_name(inv),
            days_overdue: days,
            bucket,
            outstanding: inv.amount_residual,
            accrued_interest: interest,
            status,
        });
    }

    if missing_due_dates > 0 {
        warnings.push(format!(
            "{missing_due_dates} open invoice(s) without a due date were classified as current"
        ));
    }

    // Non-positive net balances are credits, not debt
    let mut top_debtors: Vec<Debtor> = by_debtor
        .into_iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .map(|(customer, outstanding)| Debtor {
            customer,
            outstanding,
        })
        .collect();
    top_debtors.sort_by(|a, b| b.outstanding.cmp(&a.outstanding));
    top_debtors.truncate(input.top_debtors);

    let dso_by_country: BTreeMap<String, Decimal> = by_country
        .iter()
        .map(|(country, (residual, sales))| {
            (country.clone(), dso(*residual, *sales, input.period_days))
        })
        .collect();
    let dso_overall = dso(total_outstanding, total_sales, input.period_days);

    let pct_overdue = if total_outstanding > Decimal::ZERO {
        (overdue_amount / total_outstanding * dec!(100)).round_dp(1)
    } else {
        Decimal::ZERO
    };
    let avg_days_overdue = if overdue_count > 0 {
        (Decimal::from(overdue_days_sum) / Decimal::from(overdue_count as u64)).round_dp(1)
    } else {
        Decimal::ZERO
    };

    let current_amount = total_outstanding - overdue_amount;
    let invoice_count = details.len();

    let summary = AgingSummary {
        buckets,
        dso_by_country,
        dso_overall,
        top_debtors,
        total_outstanding,
        overdue_amount,
        current_amount,
        pct_overdue,
        avg_days_overdue,
        accrued_interest,
        invoice_count,
        payment_state_counts,
        details,
    };

    Ok(with_metadata(
        "Aging buckets on days past due; daily-compounded moratory interest \
         (360-day basis, 8-day grace); DSO = residual / sales * period days",
        input,
        warnings,
        start.elapsed().as_micros() as u64,
        summary,
    ))
}
