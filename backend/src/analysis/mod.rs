//! Aggregation analyses over the enriched and exploded tables.
//!
//! Every analysis is a pure function of a read-only slice. Grouping keys come
//! out in ascending order (seasons in calendar order), and top-N selection
//! goes through [`top_n_within_groups`], which keeps first-encountered order
//! for ties.
//!
//! - [`kpi`] - yearly KPI summary and top promotion
//! - [`uplift`] - promotion uplift by customer category and store type
//! - [`seasonal`] - top products per season, season × category heatmap
//! - [`response`] - best promotion per customer category
//! - [`channels`] - profit by store type and payment method

pub mod channels;
pub mod kpi;
pub mod response;
pub mod seasonal;
pub mod uplift;

pub use channels::{
    channel_profit, profit_by_payment_method, profit_by_store_type, ChannelProfit,
    PaymentMethodProfit, StoreTypeProfit,
};
pub use kpi::{available_years, kpi_summary, top_promotion, KpiSummary, TopPromotion};
pub use response::{customer_response, CustomerResponseRow};
pub use seasonal::{category_heatmap, top_products_by_season, CategoryHeatmap, HeatmapCell, SeasonProductRow};
pub use uplift::{promotion_uplift, UpliftRow};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Outcome of one dashboard section.
///
/// A failing analysis becomes `Unavailable` so the other sections still render.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Section<T> {
    Ready { data: T },
    Unavailable { reason: String },
}

impl<T> Section<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Section::Ready { data },
            Err(e) => Section::Unavailable { reason: e.to_string() },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready { data } => Some(data),
            Section::Unavailable { .. } => None,
        }
    }
}

/// Percentage change of `sales` over `baseline`; `None` when the baseline is zero.
pub fn uplift_pct(sales: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some((sales - baseline) / baseline * 100.0)
    }
}

/// Keep the `n` highest-scoring rows of each group.
///
/// Groups are emitted in ascending key order. Within a group rows are sorted
/// by descending score with a stable sort, so equal scores keep their input
/// order.
pub fn top_n_within_groups<T, K, FK, FS>(rows: Vec<T>, key: FK, score: FS, n: usize) -> Vec<T>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FS: Fn(&T) -> f64,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }

    groups
        .into_values()
        .flat_map(|mut group| {
            group.sort_by(|a, b| score(b).total_cmp(&score(a)));
            group.truncate(n);
            group
        })
        .collect()
}

/// Sum `value` per key, keys in ascending order.
pub(crate) fn sum_by<T, K, FK, FV>(rows: &[T], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut sums = BTreeMap::new();
    for row in rows {
        *sums.entry(key(row)).or_insert(0.0) += value(row);
    }
    sums
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_n_orders_groups_and_scores() {
        let rows = vec![("b", 1.0), ("a", 5.0), ("b", 9.0), ("a", 7.0), ("a", 6.0), ("b", 3.0)];
        let top = top_n_within_groups(rows, |r| r.0, |r| r.1, 2);
        assert_eq!(top, vec![("a", 7.0), ("a", 6.0), ("b", 9.0), ("b", 3.0)]);
    }

    #[test]
    fn test_top_n_ties_keep_first_encountered() {
        let rows = vec![("g", 1.0, "first"), ("g", 2.0, "x"), ("g", 1.0, "second"), ("g", 1.0, "third")];
        let top = top_n_within_groups(rows, |r| r.0, |r| r.1, 3);
        let labels: Vec<&str> = top.iter().map(|r| r.2).collect();
        assert_eq!(labels, vec!["x", "first", "second"]);
    }

    #[test]
    fn test_top_n_small_groups() {
        let top = top_n_within_groups(vec![("a", 1.0)], |r| r.0, |r| r.1, 3);
        assert_eq!(top.len(), 1);
        let empty: Vec<(&str, f64)> = top_n_within_groups(Vec::new(), |r: &(&str, f64)| r.0, |r| r.1, 3);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_uplift_pct() {
        assert_eq!(uplift_pct(110.0, 100.0), Some(10.0));
        assert_eq!(uplift_pct(50.0, 100.0), Some(-50.0));
        assert_eq!(uplift_pct(10.0, 0.0), None);
    }

    #[test]
    fn test_section_serialization() {
        let ready: Section<u32> = Section::from_result::<String>(Ok(3));
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            serde_json::json!({ "status": "ready", "data": 3 })
        );

        let missing: Section<u32> = Section::from_result(Err("no data"));
        assert!(!missing.is_ready());
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            serde_json::json!({ "status": "unavailable", "reason": "no data" })
        );
    }
}
