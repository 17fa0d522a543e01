//! Sparse goal (target) store keyed by organizational unit, optional
//! individual and calendar month.
//!
//! Goals are entered by a user-facing form and read by the KPI engine; a
//! lookup miss means "no target", which the attainment formulas treat as
//! zero. The composite-key map replaces the nested per-level lookups of the
//! source system, so there is exactly one place where absence becomes zero.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;
use crate::types::Money;
use crate::AnalyticsResult;

/// A calendar month, the granularity at which goals are set.
/// Renders as `YYYY-MM`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Years accepted for goal periods. Keeps every representable month
    /// safely inside chrono's calendar range.
    pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;

    pub fn new(year: i32, month: u32) -> AnalyticsResult<Self> {
        if !(1..=12).contains(&month) || !Self::YEAR_RANGE.contains(&year) {
            return Err(AnalyticsError::InvalidPeriodKey(format!(
                "{year:04}-{month:02}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of calendar days in this month.
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        // year and month are bounded in `new`, so both dates exist
        let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
        first_of_next.pred_opt().unwrap().day()
    }

    /// Pacing day for this period as the source dashboards compute it:
    /// the current day while the period is running, the last day of the
    /// month once it has closed (so a closed month paces against its full
    /// length). Callers remain free to pass any other day to `attainment`.
    pub fn elapsed_day(&self, today: NaiveDate) -> u32 {
        if today.year() == self.year && today.month() == self.month {
            today.day()
        } else {
            self.days_in_month()
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AnalyticsError::InvalidPeriodKey(s.to_string());
        let (year_s, month_s) = s.split_once('-').ok_or_else(bad)?;
        let year: i32 = year_s.parse().map_err(|_| bad())?;
        let month: u32 = month_s.parse().map_err(|_| bad())?;
        PeriodKey::new(year, month).map_err(|_| bad())
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(p: PeriodKey) -> Self {
        p.to_string()
    }
}

/// The twelve period keys of a calendar year, January first.
pub fn months_of_year(year: i32) -> AnalyticsResult<Vec<PeriodKey>> {
    (1..=12).map(|m| PeriodKey::new(year, m)).collect()
}

/// Target values for one (unit, individual, period) slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEntry {
    pub target_total: Money,
    /// Target for new-product (IPN) revenue within the total
    pub target_new_product_total: Money,
}

/// Composite lookup key. `individual: None` addresses the unit-level goal;
/// `Some(id)` a specific person inside the unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoalKey {
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
    pub period: PeriodKey,
}

impl GoalKey {
    pub fn unit(unit: impl Into<String>, period: PeriodKey) -> Self {
        Self {
            unit: unit.into(),
            individual: None,
            period,
        }
    }

    pub fn individual(
        unit: impl Into<String>,
        individual: impl Into<String>,
        period: PeriodKey,
    ) -> Self {
        Self {
            unit: unit.into(),
            individual: Some(individual.into()),
            period,
        }
    }
}

/// Sparse goal table. Absence at any level means target = 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalStore {
    entries: BTreeMap<GoalKey, GoalEntry>,
}

impl GoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the entry for `key`.
    pub fn set(&mut self, key: GoalKey, entry: GoalEntry) {
        self.entries.insert(key, entry);
    }

    /// Zero-default accessor: a missing slot reads as a zero target.
    pub fn get(&self, key: &GoalKey) -> GoalEntry {
        self.entries.get(key).copied().unwrap_or_default()
    }

    /// Unit-level goals (individual = None) for one period, keyed by unit.
    pub fn unit_goals(&self, period: PeriodKey) -> BTreeMap<String, GoalEntry> {
        self.entries
            .iter()
            .filter(|(k, _)| k.individual.is_none() && k.period == period)
            .map(|(k, e)| (k.unit.clone(), *e))
            .collect()
    }

    /// Per-individual goals inside one unit for one period, keyed by
    /// individual id.
    pub fn individual_goals(
        &self,
        unit: &str,
        period: PeriodKey,
    ) -> BTreeMap<String, GoalEntry> {
        self.entries
            .iter()
            .filter(|(k, _)| k.unit == unit && k.period == period)
            .filter_map(|(k, e)| k.individual.clone().map(|i| (i, *e)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn feb() -> PeriodKey {
        PeriodKey::new(2025, 2).unwrap()
    }

    #[test]
    fn test_period_key_roundtrip() {
        let p: PeriodKey = "2025-07".parse().unwrap();
        assert_eq!(p.year(), 2025);
        assert_eq!(p.month(), 7);
        assert_eq!(p.to_string(), "2025-07");
    }

    #[test]
    fn test_period_key_rejects_garbage() {
        assert!("2025".parse::<PeriodKey>().is_err());
        assert!("2025-13".parse::<PeriodKey>().is_err());
        assert!("2025-00".parse::<PeriodKey>().is_err());
        assert!("abcd-ef".parse::<PeriodKey>().is_err());
    }

    #[test]
    fn test_period_key_rejects_out_of_range_years() {
        assert!("9999999-12".parse::<PeriodKey>().is_err());
        assert!(PeriodKey::new(10_000, 1).is_err());
        assert!(PeriodKey::new(1899, 12).is_err());
        assert!(PeriodKey::new(-5, 6).is_err());
        // boundary years still work, December included
        assert_eq!(PeriodKey::new(9999, 12).unwrap().days_in_month(), 31);
        assert_eq!(PeriodKey::new(1900, 2).unwrap().days_in_month(), 28);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(feb().days_in_month(), 28);
        assert_eq!(PeriodKey::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(PeriodKey::new(2025, 12).unwrap().days_in_month(), 31);
        assert_eq!(PeriodKey::new(2025, 4).unwrap().days_in_month(), 30);
    }

    #[test]
    fn test_elapsed_day_current_vs_closed_month() {
        let p = PeriodKey::new(2025, 3).unwrap();
        let mid_march = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let in_april = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        assert_eq!(p.elapsed_day(mid_march), 14, "running month uses today");
        assert_eq!(p.elapsed_day(in_april), 31, "closed month uses its length");
    }

    #[test]
    fn test_months_of_year() {
        let months = months_of_year(2025).unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].to_string(), "2025-01");
        assert_eq!(months[11].to_string(), "2025-12");
        assert!(months_of_year(9_999_999).is_err());
    }

    #[test]
    fn test_missing_goal_reads_as_zero() {
        let store = GoalStore::new();
        let entry = store.get(&GoalKey::unit("PETMEDICA", feb()));
        assert_eq!(entry.target_total, dec!(0));
        assert_eq!(entry.target_new_product_total, dec!(0));
    }

    #[test]
    fn test_set_then_get() {
        let mut store = GoalStore::new();
        store.set(
            GoalKey::unit("AGROVET", feb()),
            GoalEntry {
                target_total: dec!(250_000),
                target_new_product_total: dec!(40_000),
            },
        );
        let entry = store.get(&GoalKey::unit("AGROVET", feb()));
        assert_eq!(entry.target_total, dec!(250_000));
        assert_eq!(entry.target_new_product_total, dec!(40_000));
    }

    #[test]
    fn test_unit_goals_exclude_individual_entries() {
        let mut store = GoalStore::new();
        store.set(
            GoalKey::unit("PETMEDICA", feb()),
            GoalEntry {
                target_total: dec!(100),
                target_new_product_total: dec!(10),
            },
        );
        store.set(
            GoalKey::individual("PETMEDICA", "42", feb()),
            GoalEntry {
                target_total: dec!(60),
                target_new_product_total: dec!(5),
            },
        );

        let units = store.unit_goals(feb());
        assert_eq!(units.len(), 1);
        assert_eq!(units["PETMEDICA"].target_total, dec!(100));
    }

    #[test]
    fn test_individual_goals_scoped_to_unit_and_period() {
        let mut store = GoalStore::new();
        let mar = PeriodKey::new(2025, 3).unwrap();
        store.set(
            GoalKey::individual("PETMEDICA", "42", feb()),
            GoalEntry {
                target_total: dec!(60),
                target_new_product_total: dec!(0),
            },
        );
        store.set(
            GoalKey::individual("PETMEDICA", "43", feb()),
            GoalEntry {
                target_total: dec!(70),
                target_new_product_total: dec!(0),
            },
        );
        store.set(
            GoalKey::individual("PETMEDICA", "42", mar),
            GoalEntry {
                target_total: dec!(80),
                target_new_product_total: dec!(0),
            },
        );
        store.set(
            GoalKey::individual("AGROVET", "42", feb()),
            GoalEntry {
                target_total: dec!(90),
                target_new_product_total: dec!(0),
            },
        );

        let sellers = store.individual_goals("PETMEDICA", feb());
        assert_eq!(sellers.len(), 2);
        assert_eq!(sellers["42"].target_total, dec!(60));
        assert_eq!(sellers["43"].target_total, dec!(70));
    }

    #[test]
    fn test_update_replaces_entry() {
        let mut store = GoalStore::new();
        let key = GoalKey::unit("GENVET", feb());
        store.set(
            key.clone(),
            GoalEntry {
                target_total: dec!(10),
                target_new_product_total: dec!(1),
            },
        );
        store.set(
            key.clone(),
            GoalEntry {
                target_total: dec!(20),
                target_new_product_total: dec!(2),
            },
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).target_total, dec!(20));
    }

    #[test]
    fn test_period_key_serde_as_string() {
        let p = PeriodKey::new(2025, 9).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"2025-09\"");
        let back: PeriodKey = serde_json::from_str("\"2025-09\"").unwrap();
        assert_eq!(back, p);
    }
}
