//! Pure receivables calculators.
//!
//! All functions are total: missing dates, zero denominators and negative
//! principals degrade to a zero or neutral result instead of erroring.
//! Callers pre-filter clearly corrupt records.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::types::{AgingBucket, Money, Rate};

/// Contractual grace period in days before moratory interest accrues.
pub const GRACE_PERIOD_DAYS: i64 = 8;

/// Commercial-year basis for converting an annual rate to a daily one.
const DAYS_BASIS: Decimal = dec!(360);

/// Signed days between `due_date` and `as_of`: positive means overdue,
/// zero or negative means current. Missing due date reads as 0.
pub fn days_overdue(due_date: Option<NaiveDate>, as_of: NaiveDate) -> i64 {
    match due_date {
        Some(due) => (as_of - due).num_days(),
        None => 0,
    }
}

/// Classify days overdue into an aging bucket. Negative inputs clamp to
/// zero, so anything not yet due is `current`.
pub fn aging_bucket(days_overdue: i64) -> AgingBucket {
    match days_overdue.max(0) {
        0 => AgingBucket::Current,
        1..=30 => AgingBucket::Days1To30,
        31..=60 => AgingBucket::Days31To60,
        61..=90 => AgingBucket::Days61To90,
        _ => AgingBucket::Over90,
    }
}

/// Moratory interest on an overdue principal, compounded daily on a
/// 360-day commercial year after an 8-day grace period.
///
/// `daily_rate = (1 + annual_rate)^(1/360) - 1`, then simple accrual
/// `effective_days * daily_rate * principal`, rounded to 2 decimals.
pub fn moratory_interest(days_overdue: i64, annual_rate: Rate, principal: Money) -> Money {
    if days_overdue <= GRACE_PERIOD_DAYS || principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if annual_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let effective_days = Decimal::from(days_overdue - GRACE_PERIOD_DAYS);
    let daily_rate = (Decimal::ONE + annual_rate).powd(Decimal::ONE / DAYS_BASIS) - Decimal::ONE;
    (effective_days * daily_rate * principal).round_dp(2)
}

/// Days sales outstanding: receivables balance expressed in days of credit
/// sales. Zero when there were no credit sales in the period.
pub fn dso(receivables_balance: Money, credit_sales: Money, period_days: u32) -> Decimal {
    if credit_sales == Decimal::ZERO {
        return Decimal::ZERO;
    }
    (receivables_balance / credit_sales * Decimal::from(period_days)).round_dp(1)
}

/// Collection effectiveness index, capped at 100 since effectiveness
/// cannot exceed full collection. Zero when nothing was collectible.
pub fn cei(collected: Money, collectible: Money) -> Decimal {
    if collectible == Decimal::ZERO {
        return Decimal::ZERO;
    }
    (collected / collectible * dec!(100)).min(dec!(100)).round_dp(1)
}
