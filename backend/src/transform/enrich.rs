//! Enrichment stage: raw rows → [`EnrichedTransaction`].
//!
//! Parses the product list and the date, normalizes the promotion label and
//! derives sales, profit, profit margin and year. Pure and deterministic.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::{DateParseError, EnrichResult, ProductListParseError};
use crate::models::{EnrichedTransaction, RawTransaction, NO_PROMOTION};
use crate::parser::parse_product_list;

/// Tokens read as a missing promotion, on top of the empty string.
const NA_TOKENS: [&str; 9] = ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "<NA>"];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Enrich every raw row. The first failing row aborts the stage.
pub fn enrich(raw: &[RawTransaction]) -> EnrichResult<Vec<EnrichedTransaction>> {
    raw.iter()
        .enumerate()
        .map(|(row, record)| enrich_row(row, record))
        .collect()
}

/// Enrich a single row; `row` is only used for error context.
pub fn enrich_row(row: usize, record: &RawTransaction) -> EnrichResult<EnrichedTransaction> {
    let products = parse_product_list(&record.product).map_err(|reason| ProductListParseError {
        row,
        value: record.product.clone(),
        reason,
    })?;

    let date = parse_date(&record.date).ok_or_else(|| DateParseError {
        row,
        value: record.date.clone(),
    })?;

    let sales = record.total_cost * f64::from(record.total_items);
    let profit = sales - record.total_cost;

    Ok(EnrichedTransaction {
        date,
        year: date.year(),
        month: date.month(),
        total_cost: record.total_cost,
        total_items: record.total_items,
        products,
        promotion: normalize_promotion(record.promotion.as_deref()),
        customer_category: record.customer_category.clone(),
        store_type: record.store_type.clone(),
        payment_method: record.payment_method.clone(),
        sales,
        profit,
        profit_margin: profit_margin(profit, sales),
    })
}

/// `profit / sales * 100`, missing when sales is zero.
pub fn profit_margin(profit: f64, sales: f64) -> Option<f64> {
    if sales == 0.0 {
        None
    } else {
        Some(profit / sales * 100.0)
    }
}

/// Map a missing promotion to the `"None"` sentinel.
pub fn normalize_promotion(value: Option<&str>) -> String {
    match value.map(str::trim) {
        None => NO_PROMOTION.to_string(),
        Some(v) if v.is_empty() || NA_TOKENS.contains(&v) => NO_PROMOTION.to_string(),
        Some(v) => v.to_string(),
    }
}

/// Parse the date formats found in transaction exports.
///
/// Dates without a time component are taken at midnight. Offsets in RFC 3339
/// values are dropped (local wall-clock time is kept).
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
