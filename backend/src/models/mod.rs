//! Domain models for the retail promotions pipeline.
//!
//! - [`RawTransaction`] - one CSV row as read from disk
//! - [`EnrichedTransaction`] - a row with derived sales/profit/margin/year
//! - [`ExplodedRow`] - one product of one transaction, with category and season
//! - [`Season`] - calendar season derived from the month

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Promotion label used for transactions without a promotion.
///
/// Every uplift computation uses the `"None"` rows as its baseline.
pub const NO_PROMOTION: &str = "None";

/// Columns the source CSV must carry. Any extra column is ignored.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "total_cost",
    "total_items",
    "product",
    "promotion",
    "customer_category",
    "store_type",
    "payment_method",
];

// =============================================================================
// Raw Transaction
// =============================================================================

/// A transaction exactly as it appears in the source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTransaction {
    pub date: String,
    pub total_cost: f64,
    pub total_items: u32,
    /// Serialized list literal, e.g. `['Milk', 'Soap']`.
    pub product: String,
    #[serde(default)]
    pub promotion: Option<String>,
    pub customer_category: String,
    pub store_type: String,
    pub payment_method: String,
}

// =============================================================================
// Enriched Transaction
// =============================================================================

/// A transaction with its derived metrics.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedTransaction {
    pub date: NaiveDateTime,
    pub year: i32,
    pub month: u32,
    pub total_cost: f64,
    pub total_items: u32,
    pub products: Vec<String>,
    /// Normalized: missing values become [`NO_PROMOTION`].
    pub promotion: String,
    pub customer_category: String,
    pub store_type: String,
    pub payment_method: String,
    /// `total_cost * total_items`
    pub sales: f64,
    /// `sales - total_cost`
    pub profit: f64,
    /// `profit / sales * 100`, `None` when sales is zero.
    pub profit_margin: Option<f64>,
}

impl EnrichedTransaction {
    /// Whether this transaction ran without a promotion.
    pub fn is_baseline(&self) -> bool {
        self.promotion == NO_PROMOTION
    }
}

// =============================================================================
// Exploded Row
// =============================================================================

/// One product line of a transaction.
///
/// All non-product fields are copied from the parent transaction, so
/// `sales` and `profit` are the transaction totals, not per-product shares.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExplodedRow {
    /// Index of the parent row in the enriched table.
    pub transaction: usize,
    pub date: NaiveDateTime,
    pub year: i32,
    pub product: String,
    /// `None` when the product is absent from the category map.
    pub product_category: Option<String>,
    pub season: Season,
    pub promotion: String,
    pub customer_category: String,
    pub store_type: String,
    pub payment_method: String,
    pub total_cost: f64,
    pub total_items: u32,
    pub sales: f64,
    pub profit: f64,
    pub profit_margin: Option<f64>,
}

// =============================================================================
// Season
// =============================================================================

/// Calendar season. Ordering follows the calendar, starting with Winter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Season for a 1-based month: index `(month % 12) / 3 + 1`.
    ///
    /// December through February map to Winter.
    pub fn from_month(month: u32) -> Self {
        match (month % 12) / 3 + 1 {
            1 => Season::Winter,
            2 => Season::Spring,
            3 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
