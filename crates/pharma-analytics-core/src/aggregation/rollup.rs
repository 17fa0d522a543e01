//! Multi-level drill-down rollups over transaction lines.
//!
//! One pass over the records builds a tree: each record contributes its
//! amount to every node along its dimension path, so a coarse total is
//! always explained by the breakdowns one level below it. Records are
//! attributed to exactly one path; a missing or malformed tag becomes the
//! `SENTINEL` key instead of dropping the record, which is what keeps the
//! conservation invariant intact.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::types::{LifeCycle, Money, TagRef, TransactionLine};

/// Key used for records whose tag is absent for the dimension in play.
pub const SENTINEL: &str = "N/A";

/// A grouping axis. Extractors are total: any record yields a key or the
/// sentinel, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    CommercialLine,
    PharmacologicalClass,
    AdministrationRoute,
    ProductionLine,
    PharmaceuticalForm,
    ProductCategory,
    SalesChannel,
    Seller,
    Customer,
    LifeCycle,
    Product,
}

fn tag_key(tag: &Option<TagRef>) -> String {
    match tag {
        Some(t) if !t.label.trim().is_empty() => t.label.trim().to_string(),
        _ => SENTINEL.to_string(),
    }
}

impl Dimension {
    /// Grouping key of `line` along this dimension.
    pub fn extract(&self, line: &TransactionLine) -> String {
        match self {
            Dimension::CommercialLine => tag_key(&line.commercial_line),
            Dimension::PharmacologicalClass => tag_key(&line.pharmacological_class),
            Dimension::AdministrationRoute => tag_key(&line.administration_route),
            Dimension::ProductionLine => tag_key(&line.production_line),
            Dimension::PharmaceuticalForm => tag_key(&line.pharmaceutical_form),
            Dimension::ProductCategory => tag_key(&line.product_category),
            Dimension::SalesChannel => tag_key(&line.sales_channel),
            Dimension::Seller => tag_key(&line.seller),
            Dimension::Customer => tag_key(&line.customer),
            Dimension::LifeCycle => match line.life_cycle {
                LifeCycle::New => "new".to_string(),
                LifeCycle::Growing => "growing".to_string(),
                LifeCycle::Mature => "mature".to_string(),
                LifeCycle::Declining => "declining".to_string(),
                LifeCycle::Undefined => SENTINEL.to_string(),
            },
            Dimension::Product => {
                let name = line.product_name.trim();
                if name.is_empty() {
                    SENTINEL.to_string()
                } else {
                    name.to_string()
                }
            }
        }
    }
}

/// Per-product amounts accumulated in first-insertion order, so equal
/// totals rank deterministically for a fixed input order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LeafTotals {
    entries: Vec<(String, Money)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LeafTotals {
    fn add(&mut self, name: &str, amount: Money) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), amount));
            }
        }
    }

    pub fn get(&self, name: &str) -> Money {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Products in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }
}

/// One node of the rollup tree. `total` always equals the sum of the
/// children's totals (and of the leaf totals) by construction.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionNode {
    pub key: String,
    pub total: Money,
    pub children: BTreeMap<String, DimensionNode>,
    /// Per-product totals across all descendants, for top-N views
    pub leaf_totals: LeafTotals,
}

/// A product's share of a node, for top-N charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductShare {
    pub product: String,
    pub amount: Money,
}

/// One direct child of a node with its total, for drill-level charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildSlice {
    pub key: String,
    pub total: Money,
}

impl DimensionNode {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            total: Decimal::ZERO,
            children: BTreeMap::new(),
            leaf_totals: LeafTotals::default(),
        }
    }

    pub fn child(&self, key: &str) -> Option<&DimensionNode> {
        self.children.get(key)
    }

    /// Top `n` products by accumulated amount, descending. Ties keep
    /// first-insertion order (stable sort), so the ranking is
    /// deterministic for a fixed input order.
    pub fn top_products(&self, n: usize) -> Vec<ProductShare> {
        let mut shares: Vec<ProductShare> = self
            .leaf_totals
            .iter()
            .map(|(product, amount)| ProductShare {
                product: product.to_string(),
                amount,
            })
            .collect();
        shares.sort_by(|a, b| b.amount.cmp(&a.amount));
        shares.truncate(n);
        shares
    }

    /// Direct children descending by total; ties fall back to key order.
    pub fn child_breakdown(&self) -> Vec<ChildSlice> {
        let mut slices: Vec<ChildSlice> = self
            .children
            .values()
            .map(|c| ChildSlice {
                key: c.key.clone(),
                total: c.total,
            })
            .collect();
        slices.sort_by(|a, b| b.total.cmp(&a.total));
        slices
    }
}

/// Build the rollup tree for `records` along the ordered `dims`, taking
/// each record's contribution from `amount`.
///
/// Zero-amount records are skipped (they carry no attribution). An empty
/// input yields a zero root with no children.
pub fn aggregate<'a, I, F>(records: I, dims: &[Dimension], amount: F) -> DimensionNode
where
    I: IntoIterator<Item = &'a TransactionLine>,
    F: Fn(&TransactionLine) -> Money,
{
    let mut root = DimensionNode::new("root");

    for line in records {
        let value = amount(line);
        if value.is_zero() {
            continue;
        }
        let product = Dimension::Product.extract(line);

        root.total += value;
        root.leaf_totals.add(&product, value);

        let mut node = &mut root;
        for dim in dims {
            let key = dim.extract(line);
            node = node
                .children
                .entry(key.clone())
                .or_insert_with(|| DimensionNode::new(key));
            node.total += value;
            node.leaf_totals.add(&product, value);
        }
    }

    root
}

/// Rollup over the signed invoice balances, the common case.
pub fn aggregate_balance<'a, I>(records: I, dims: &[Dimension]) -> DimensionNode
where
    I: IntoIterator<Item = &'a TransactionLine>,
{
    aggregate(records, dims, |l| l.balance)
}
