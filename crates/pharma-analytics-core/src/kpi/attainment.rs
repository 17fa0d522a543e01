//! Attainment, pacing and projection formulas.
//!
//! The same formula set serves two granularities: per commercial line with
//! whole-period goals, and per seller within a line with monthly seller
//! goals. Callers supply `day_of_period` and `days_in_period` explicitly
//! (see `PeriodKey::elapsed_day` for the usual policy).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::goals::GoalEntry;
use crate::kpi::actuals::ActualSet;
use crate::types::Money;

/// Goal-vs-actual figures for one attainment slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KpiRow {
    pub target_total: Money,
    pub actual_total: Money,
    /// Actual as a percentage of target; 0 when there is no target
    pub pct_attainment: Decimal,
    /// Attainment percentage earned per elapsed day
    pub daily_pace_pct: Decimal,
    /// Current run-rate extrapolated to the full period
    pub linear_projection: Money,
    pub projected_pct: Decimal,
    /// Amount still missing against the target, never negative
    pub shortfall: Money,
    pub target_new: Money,
    pub actual_new: Money,
    pub pct_new: Decimal,
    pub near_expiry_total: Money,
}

/// Per-slot rows plus the aggregate row recomputed from summed amounts.
#[derive(Debug, Clone, Serialize)]
pub struct AttainmentReport {
    pub rows: BTreeMap<String, KpiRow>,
    /// Period-wide row: amounts summed across slots, formulas reapplied.
    /// Never the average of the per-slot percentages.
    pub totals: KpiRow,
}

fn pct(actual: Money, target: Money) -> Decimal {
    if target > Decimal::ZERO {
        actual / target * dec!(100)
    } else {
        Decimal::ZERO
    }
}

fn kpi_row(
    goal: GoalEntry,
    actual: ActualSet,
    day_of_period: u32,
    days_in_period: u32,
) -> KpiRow {
    let target = goal.target_total;
    let pct_attainment = pct(actual.total, target);

    let day = Decimal::from(day_of_period);
    let daily_pace_pct = if target > Decimal::ZERO && day_of_period > 0 {
        pct_attainment / day
    } else {
        Decimal::ZERO
    };
    let linear_projection = if day_of_period > 0 {
        actual.total / day * Decimal::from(days_in_period)
    } else {
        Decimal::ZERO
    };
    let projected_pct = pct(linear_projection, target);

    let shortfall = (target - actual.total).max(Decimal::ZERO);

    KpiRow {
        target_total: target,
        actual_total: actual.total,
        pct_attainment,
        daily_pace_pct,
        linear_projection,
        projected_pct,
        shortfall,
        target_new: goal.target_new_product_total,
        actual_new: actual.new_product_total,
        pct_new: pct(actual.new_product_total, goal.target_new_product_total),
        near_expiry_total: actual.near_expiry_total,
    }
}

/// Join actuals with goals over the union of their keys and compute a
/// `KpiRow` per slot. A slot present on only one side still appears, with
/// the missing side read as zero.
pub fn attainment(
    actuals: &BTreeMap<String, ActualSet>,
    goals: &BTreeMap<String, GoalEntry>,
    day_of_period: u32,
    days_in_period: u32,
) -> AttainmentReport {
    let keys: BTreeSet<&String> = actuals.keys().chain(goals.keys()).collect();

    let mut rows = BTreeMap::new();
    let mut total_goal = GoalEntry::default();
    let mut total_actual = ActualSet::default();

    for key in keys {
        let goal = goals.get(key).copied().unwrap_or_default();
        let actual = actuals.get(key).copied().unwrap_or_default();

        total_goal.target_total += goal.target_total;
        total_goal.target_new_product_total += goal.target_new_product_total;
        total_actual.total += actual.total;
        total_actual.new_product_total += actual.new_product_total;
        total_actual.near_expiry_total += actual.near_expiry_total;

        rows.insert(
            key.clone(),
            kpi_row(goal, actual, day_of_period, days_in_period),
        );
    }

    AttainmentReport {
        rows,
        totals: kpi_row(total_goal, total_actual, day_of_period, days_in_period),
    }
}
