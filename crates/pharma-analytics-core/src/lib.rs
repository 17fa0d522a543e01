pub mod error;
pub mod filters;
pub mod goals;
pub mod types;

#[cfg(feature = "aggregation")]
pub mod aggregation;

#[cfg(feature = "kpi")]
pub mod kpi;

#[cfg(feature = "receivables")]
pub mod receivables;

#[cfg(feature = "dashboard")]
pub mod dashboard;

pub use error::AnalyticsError;
pub use types::*;

/// Standard result type for all analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
