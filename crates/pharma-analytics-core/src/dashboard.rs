//! Presentation-ready sales overview: one pass over the domestic lines
//! producing the totals, breakdowns and top-N lists the charts consume.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::aggregation::{aggregate_balance, ChildSlice, Dimension, ProductShare};
use crate::filters::domestic_lines;
use crate::kpi::{line_actuals, ActualSet};
use crate::types::{with_metadata, ComputationOutput, LifeCycle, Money, Qty, TransactionLine};

/// Tuning knobs for the overview lists.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewOptions {
    pub top_products: usize,
    pub top_customers: usize,
}

impl Default for OverviewOptions {
    fn default() -> Self {
        Self {
            top_products: 15,
            top_customers: 15,
        }
    }
}

/// A ranked product with its life-cycle stage for chart tooltips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductOverview {
    pub product: String,
    pub amount: Money,
    pub life_cycle: LifeCycle,
}

/// Everything the sales landing page renders, precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct SalesOverview {
    pub total_sales: Money,
    pub total_quantity: Qty,
    /// Number of domestic transaction lines behind the figures
    pub line_count: usize,
    pub by_commercial_line: Vec<ChildSlice>,
    pub by_channel: Vec<ChildSlice>,
    pub by_life_cycle: Vec<ChildSlice>,
    pub by_pharmaceutical_form: Vec<ChildSlice>,
    pub top_products: Vec<ProductOverview>,
    pub top_customers: Vec<ChildSlice>,
    /// Per commercial line: total, new-product and near-expiry revenue
    pub line_actuals: BTreeMap<String, ActualSet>,
}

fn breakdown(records: &[&TransactionLine], dim: Dimension) -> Vec<ChildSlice> {
    aggregate_balance(records.iter().copied(), &[dim]).child_breakdown()
}

/// Build the sales overview for one period's transaction lines. Export
/// lines are excluded once up front; all figures below agree on the same
/// domestic set.
pub fn sales_overview(
    records: &[TransactionLine],
    options: &OverviewOptions,
) -> ComputationOutput<SalesOverview> {
    let start = Instant::now();
    let domestic = domestic_lines(records);

    // life-cycle stage per product, last occurrence wins (stages are
    // product-level master data, so occurrences agree in practice)
    let mut stages: HashMap<&str, LifeCycle> = HashMap::new();
    let mut total_quantity = Decimal::ZERO;
    for line in &domestic {
        stages.insert(line.product_name.as_str(), line.life_cycle);
        total_quantity += line.quantity;
    }

    let root = aggregate_balance(domestic.iter().copied(), &[]);
    let top_products = root
        .top_products(options.top_products)
        .into_iter()
        .map(|ProductShare { product, amount }| ProductOverview {
            life_cycle: stages.get(product.as_str()).copied().unwrap_or_default(),
            product,
            amount,
        })
        .collect();

    let mut top_customers = breakdown(&domestic, Dimension::Customer);
    top_customers.truncate(options.top_customers);

    let overview = SalesOverview {
        total_sales: root.total,
        total_quantity,
        line_count: domestic.len(),
        by_commercial_line: breakdown(&domestic, Dimension::CommercialLine),
        by_channel: breakdown(&domestic, Dimension::SalesChannel),
        by_life_cycle: breakdown(&domestic, Dimension::LifeCycle),
        by_pharmaceutical_form: breakdown(&domestic, Dimension::PharmaceuticalForm),
        top_products,
        top_customers,
        line_actuals: line_actuals(domestic.iter().copied()),
    };

    with_metadata(
        "Single-pass domestic rollups; export channels and lines excluded \
         before aggregation",
        options,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        overview,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagRef;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn line(
        amount: Decimal,
        product: &str,
        commercial: &str,
        customer: Option<&str>,
    ) -> TransactionLine {
        TransactionLine {
            balance: amount,
            quantity: dec!(2),
            product_name: product.to_string(),
            commercial_line: Some(TagRef::new(1, commercial)),
            pharmacological_class: None,
            administration_route: None,
            production_line: None,
            pharmaceutical_form: Some(TagRef::new(2, "INYECTABLE")),
            product_category: None,
            life_cycle: LifeCycle::Mature,
            sales_channel: Some(TagRef::new(7, "MAYORISTA")),
            delivery_route: None,
            seller: None,
            customer: customer.map(|c| TagRef::new(9, c)),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        }
    }

    #[test]
    fn test_overview_totals_and_breakdowns() {
        let records = vec![
            line(dec!(100), "AMOXIVET", "PETMEDICA", Some("CLINICA SUR")),
            line(dec!(50), "CANIGEST", "PETMEDICA", Some("CLINICA SUR")),
            line(dec!(200), "FORTEVET", "AGROVET", Some("AGRO NORTE")),
        ];
        let out = sales_overview(&records, &OverviewOptions::default());
        let s = &out.result;

        assert_eq!(s.total_sales, dec!(350));
        assert_eq!(s.line_count, 3);
        assert_eq!(s.total_quantity, dec!(6));
        assert_eq!(s.by_commercial_line[0].key, "AGROVET");
        assert_eq!(s.by_commercial_line[0].total, dec!(200));
        assert_eq!(s.by_commercial_line[1].key, "PETMEDICA");
        assert_eq!(s.top_customers[0].key, "CLINICA SUR");
        assert_eq!(s.top_customers[0].total, dec!(150));
    }

    #[test]
    fn test_exports_excluded_everywhere() {
        let records = vec![
            line(dec!(100), "AMOXIVET", "PETMEDICA", None),
            line(dec!(999), "AMOXIVET", "VENTA INTERNACIONAL", None),
        ];
        let out = sales_overview(&records, &OverviewOptions::default());
        let s = &out.result;
        assert_eq!(s.total_sales, dec!(100));
        assert_eq!(s.line_count, 1);
        assert_eq!(s.by_commercial_line.len(), 1);
        assert_eq!(s.top_products[0].amount, dec!(100));
        assert!(!s.line_actuals.contains_key("VENTA INTERNACIONAL"));
    }

    #[test]
    fn test_top_products_carry_life_cycle() {
        let mut ipn = line(dec!(80), "NUEVOVET", "PETMEDICA", None);
        ipn.life_cycle = LifeCycle::New;
        let records = vec![line(dec!(100), "AMOXIVET", "PETMEDICA", None), ipn];

        let out = sales_overview(&records, &OverviewOptions::default());
        let top = &out.result.top_products;
        assert_eq!(top[0].product, "AMOXIVET");
        assert_eq!(top[0].life_cycle, LifeCycle::Mature);
        assert_eq!(top[1].product, "NUEVOVET");
        assert_eq!(top[1].life_cycle, LifeCycle::New);
    }

    #[test]
    fn test_top_list_truncation() {
        let records: Vec<TransactionLine> = (0..10)
            .map(|i| {
                line(
                    Decimal::from(10 + i),
                    &format!("P{i}"),
                    "PETMEDICA",
                    Some(&format!("C{i}")),
                )
            })
            .collect();
        let options = OverviewOptions {
            top_products: 3,
            top_customers: 4,
        };
        let out = sales_overview(&records, &options);
        assert_eq!(out.result.top_products.len(), 3);
        assert_eq!(out.result.top_customers.len(), 4);
        assert_eq!(out.result.top_products[0].product, "P9");
    }

    #[test]
    fn test_empty_input_all_zero() {
        let out = sales_overview(&[], &OverviewOptions::default());
        let s = &out.result;
        assert_eq!(s.total_sales, Decimal::ZERO);
        assert_eq!(s.line_count, 0);
        assert_eq!(s.total_quantity, Decimal::ZERO);
        assert!(s.by_commercial_line.is_empty());
        assert!(s.top_products.is_empty());
        assert!(s.line_actuals.is_empty());
    }

    #[test]
    fn test_line_actuals_match_breakdown() {
        let records = vec![
            line(dec!(100), "AMOXIVET", "PETMEDICA", None),
            line(dec!(200), "FORTEVET", "AGROVET", None),
        ];
        let out = sales_overview(&records, &OverviewOptions::default());
        let s = &out.result;
        for slice in &s.by_commercial_line {
            assert_eq!(s.line_actuals[&slice.key].total, slice.total);
        }
    }
}
