//! Key business metrics for one year.

use serde::Serialize;
use std::collections::BTreeSet;

use super::{sum_by, Section};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::EnrichedTransaction;

/// Best-selling promotion of a year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopPromotion {
    pub promotion: String,
    pub sales: f64,
}

/// KPI cards for the selected year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KpiSummary {
    pub year: i32,
    pub transactions: usize,
    pub total_sales: f64,
    pub total_profit: f64,
    /// Mean of the defined margins; `None` if no row has one.
    pub avg_profit_margin: Option<f64>,
    pub top_promotion: Section<TopPromotion>,
}

/// Distinct years present in the table, ascending.
pub fn available_years(rows: &[EnrichedTransaction]) -> Vec<i32> {
    rows.iter()
        .map(|t| t.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Promotion (other than `"None"`) with the highest total sales in `year`.
///
/// Ties go to the promotion whose name sorts first.
pub fn top_promotion(rows: &[EnrichedTransaction], year: i32) -> AnalysisResult<TopPromotion> {
    let promoted: Vec<&EnrichedTransaction> = rows
        .iter()
        .filter(|t| t.year == year && !t.is_baseline())
        .collect();

    let totals = sum_by(&promoted, |t| t.promotion.clone(), |t| t.sales);

    let mut best: Option<TopPromotion> = None;
    for (promotion, sales) in totals {
        if best.as_ref().map_or(true, |top| sales > top.sales) {
            best = Some(TopPromotion { promotion, sales });
        }
    }

    best.ok_or(AnalysisError::NoPromotionData { year })
}

/// KPI summary for `year`.
///
/// A year without promotion rows still yields the totals; only the top
/// promotion card becomes unavailable.
pub fn kpi_summary(rows: &[EnrichedTransaction], year: i32) -> KpiSummary {
    let in_year: Vec<&EnrichedTransaction> = rows.iter().filter(|t| t.year == year).collect();

    let total_sales: f64 = in_year.iter().map(|t| t.sales).sum();
    let total_profit: f64 = in_year.iter().map(|t| t.profit).sum();

    let margins: Vec<f64> = in_year.iter().filter_map(|t| t.profit_margin).collect();
    let avg_profit_margin = if margins.is_empty() {
        None
    } else {
        Some(margins.iter().sum::<f64>() / margins.len() as f64)
    };

    KpiSummary {
        year,
        transactions: in_year.len(),
        total_sales,
        total_profit,
        avg_profit_margin,
        top_promotion: Section::from_result(top_promotion(rows, year)),
    }
}
