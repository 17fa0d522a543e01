//! Goal-vs-actual KPI engine: period attainment, daily pacing and
//! end-of-period projection for commercial units and individual sellers.

pub mod actuals;
pub mod attainment;

pub use actuals::{line_actuals, seller_actuals, ActualSet};
pub use attainment::{attainment, AttainmentReport, KpiRow};
