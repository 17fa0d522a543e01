use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.12 = 12% annual). Never as percentages.
pub type Rate = Decimal;

/// Invoiced quantities (units, packs).
pub type Qty = Decimal;

/// An `(id, label)` reference to a master-data record, as the upstream
/// business system delivers dimension tags, channels and routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i64,
    pub label: String,
}

impl TagRef {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Product life-cycle stage. Unknown/unset stages collapse to `Undefined`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeCycle {
    New,
    Growing,
    Mature,
    Declining,
    #[default]
    Undefined,
}

/// One invoiced product movement, sign-corrected so revenue is positive.
/// Read-only input to the core; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Signed amount (credit notes come through negative)
    pub balance: Money,
    pub quantity: Qty,
    pub product_name: String,
    /// Commercial line (e.g. PETMEDICA, AGROVET)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_line: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacological_class: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administration_route: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_line: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmaceutical_form: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_category: Option<TagRef>,
    #[serde(default)]
    pub life_cycle: LifeCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_channel: Option<TagRef>,
    /// Logistics route; specific route ids flag near-expiry stock movements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_route: Option<TagRef>,
    /// Invoicing salesperson
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<TagRef>,
    pub invoice_date: NaiveDate,
}

/// Payment state of an invoice as reported by the business system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    NotPaid,
    InPayment,
    Paid,
    Partial,
    Reversed,
}

/// One customer invoice at document level, as consumed by the receivables
/// roll-up. `amount_residual` is the outstanding balance still to collect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub amount_total: Money,
    pub amount_residual: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub payment_state: PaymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_channel: Option<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_line: Option<TagRef>,
}

/// Receivables age class, derived solely from days overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "1-30")]
    Days1To30,
    #[serde(rename = "31-60")]
    Days31To60,
    #[serde(rename = "61-90")]
    Days61To90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    /// All buckets in aging order.
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgingBucket::Current => "current",
            AgingBucket::Days1To30 => "1-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        };
        f.write_str(s)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
