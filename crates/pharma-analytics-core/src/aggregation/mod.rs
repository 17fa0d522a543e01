//! Dimensional drill-down aggregation over transaction lines.

pub mod rollup;

pub use rollup::{
    aggregate, aggregate_balance, ChildSlice, Dimension, DimensionNode, LeafTotals,
    ProductShare, SENTINEL,
};
