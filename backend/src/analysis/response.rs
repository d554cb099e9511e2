//! Which promotion each customer category responds to best.
//!
//! The baseline here is coarser than in [`super::uplift`]: `"None"` sales of
//! the customer category summed over every store type.

use serde::Serialize;
use std::collections::HashMap;

use super::{sum_by, top_n_within_groups, uplift_pct};
use crate::models::{EnrichedTransaction, NO_PROMOTION};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerResponseRow {
    pub customer_category: String,
    pub promotion: String,
    pub store_type: String,
    pub sales: f64,
    pub baseline_sales: f64,
    pub uplift_pct: f64,
}

/// Highest positive-uplift (promotion, store type) per customer category.
pub fn customer_response(rows: &[EnrichedTransaction]) -> Vec<CustomerResponseRow> {
    let totals = sum_by(
        rows,
        |t| (t.promotion.clone(), t.customer_category.clone(), t.store_type.clone()),
        |t| t.sales,
    );

    let mut baseline: HashMap<&str, f64> = HashMap::new();
    for ((promo, customer, _), sales) in &totals {
        if promo == NO_PROMOTION {
            *baseline.entry(customer.as_str()).or_insert(0.0) += sales;
        }
    }

    let candidates: Vec<CustomerResponseRow> = totals
        .iter()
        .filter(|((promo, _, _), _)| promo != NO_PROMOTION)
        .filter_map(|((promo, customer, store), &sales)| {
            let baseline_sales = *baseline.get(customer.as_str())?;
            let uplift = uplift_pct(sales, baseline_sales)?;
            (uplift > 0.0).then(|| CustomerResponseRow {
                customer_category: customer.clone(),
                promotion: promo.clone(),
                store_type: store.clone(),
                sales,
                baseline_sales,
                uplift_pct: uplift,
            })
        })
        .collect();

    top_n_within_groups(candidates, |r| r.customer_category.clone(), |r| r.uplift_pct, 1)
}
