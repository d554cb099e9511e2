//! Promotion uplift by customer category and store type.
//!
//! Baseline: `"None"` sales of the same (customer_category, store_type).

use serde::Serialize;
use std::collections::HashMap;

use super::{sum_by, top_n_within_groups, uplift_pct};
use crate::models::{EnrichedTransaction, NO_PROMOTION};

/// Rows kept per promotion.
pub const TOP_UPLIFTS_PER_PROMOTION: usize = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpliftRow {
    pub customer_category: String,
    pub store_type: String,
    pub promotion: String,
    pub sales: f64,
    pub baseline_sales: f64,
    pub uplift_pct: f64,
}

/// Top positive uplifts per promotion.
///
/// Groups without a `"None"` baseline, or with a zero baseline, have no
/// defined uplift and are left out.
pub fn promotion_uplift(rows: &[EnrichedTransaction]) -> Vec<UpliftRow> {
    let totals = sum_by(
        rows,
        |t| (t.customer_category.clone(), t.store_type.clone(), t.promotion.clone()),
        |t| t.sales,
    );

    let baseline: HashMap<(&str, &str), f64> = totals
        .iter()
        .filter(|((_, _, promo), _)| promo == NO_PROMOTION)
        .map(|((customer, store, _), &sales)| ((customer.as_str(), store.as_str()), sales))
        .collect();

    let candidates: Vec<UpliftRow> = totals
        .iter()
        .filter(|((_, _, promo), _)| promo != NO_PROMOTION)
        .filter_map(|((customer, store, promo), &sales)| {
            let baseline_sales = *baseline.get(&(customer.as_str(), store.as_str()))?;
            let uplift = uplift_pct(sales, baseline_sales)?;
            (uplift > 0.0).then(|| UpliftRow {
                customer_category: customer.clone(),
                store_type: store.clone(),
                promotion: promo.clone(),
                sales,
                baseline_sales,
                uplift_pct: uplift,
            })
        })
        .collect();

    top_n_within_groups(
        candidates,
        |r| r.promotion.clone(),
        |r| r.uplift_pct,
        TOP_UPLIFTS_PER_PROMOTION,
    )
}
