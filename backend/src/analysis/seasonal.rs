//! Seasonal product profitability.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::top_n_within_groups;
use crate::models::{ExplodedRow, Season};

/// Products kept per season.
pub const TOP_PRODUCTS_PER_SEASON: usize = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeasonProductRow {
    pub season: Season,
    pub product: String,
    pub sales: f64,
    pub profit: f64,
}

/// Three most profitable products of each season, seasons in calendar order.
pub fn top_products_by_season(rows: &[ExplodedRow]) -> Vec<SeasonProductRow> {
    let mut totals: BTreeMap<(Season, &str), (f64, f64)> = BTreeMap::new();
    for row in rows {
        let entry = totals.entry((row.season, row.product.as_str())).or_insert((0.0, 0.0));
        entry.0 += row.sales;
        entry.1 += row.profit;
    }

    let grouped: Vec<SeasonProductRow> = totals
        .into_iter()
        .map(|((season, product), (sales, profit))| SeasonProductRow {
            season,
            product: product.to_string(),
            sales,
            profit,
        })
        .collect();

    top_n_within_groups(grouped, |r| r.season, |r| r.profit, TOP_PRODUCTS_PER_SEASON)
}

/// One non-empty heatmap cell.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeatmapCell {
    pub season: Season,
    pub product_category: String,
    pub profit: f64,
}

/// Profit pivot: one row per season, one column per category.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryHeatmap {
    pub seasons: Vec<Season>,
    pub categories: Vec<String>,
    /// `values[season][category]`; `None` where no row exists.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CategoryHeatmap {
    pub fn get(&self, season: Season, category: &str) -> Option<f64> {
        let s = self.seasons.iter().position(|&x| x == season)?;
        let c = self.categories.iter().position(|x| x == category)?;
        self.values[s][c]
    }

    /// Tidy form of the pivot, skipping missing combinations.
    pub fn cells(&self) -> Vec<HeatmapCell> {
        let mut cells = Vec::new();
        for (s, season) in self.seasons.iter().enumerate() {
            for (c, category) in self.categories.iter().enumerate() {
                if let Some(profit) = self.values[s][c] {
                    cells.push(HeatmapCell {
                        season: *season,
                        product_category: category.clone(),
                        profit,
                    });
                }
            }
        }
        cells
    }

    pub fn total_profit(&self) -> f64 {
        self.values.iter().flatten().flatten().sum()
    }
}

/// Profit by season and product category.
///
/// Products without a category have no column and are left out.
pub fn category_heatmap(rows: &[ExplodedRow]) -> CategoryHeatmap {
    let mut totals: BTreeMap<(Season, &str), f64> = BTreeMap::new();
    for row in rows {
        if let Some(category) = row.product_category.as_deref() {
            *totals.entry((row.season, category)).or_insert(0.0) += row.profit;
        }
    }

    let seasons: Vec<Season> = totals
        .keys()
        .map(|(s, _)| *s)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let categories: Vec<&str> = totals
        .keys()
        .map(|(_, c)| *c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let values: Vec<Vec<Option<f64>>> = seasons
        .iter()
        .map(|season| {
            categories
                .iter()
                .map(|category| totals.get(&(*season, *category)).copied())
                .collect()
        })
        .collect();

    CategoryHeatmap {
        seasons,
        categories: categories.into_iter().map(String::from).collect(),
        values,
    }
}
