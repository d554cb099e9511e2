//! High-level pipeline API: CSV → enriched + exploded tables → dashboard.
//!
//! The dataset is loaded once and then passed by reference to every
//! analysis. Nothing here keeps global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use retail_promo::{build_dashboard, CategoryMap, Dataset};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = Dataset::load(Path::new("retail_promo.csv"), &CategoryMap::default())?;
//!     let dashboard = build_dashboard(&dataset, Some(2023));
//!     println!("{}", serde_json::to_string_pretty(&dashboard)?);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use crate::analysis::{
    available_years, category_heatmap, channel_profit, customer_response, kpi_summary,
    promotion_uplift, top_products_by_season, CategoryHeatmap, ChannelProfit,
    CustomerResponseRow, KpiSummary, SeasonProductRow, Section, UpliftRow,
};
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::catalog::CategoryMap;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{EnrichedTransaction, ExplodedRow};
use crate::parser::{load_transactions, parse_transactions_bytes, ParseResult};

use super::{enrich, explode};

/// Where the data came from
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub path: Option<String>,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// The loaded, immutable tables shared by every analysis.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: SourceInfo,
    pub transactions: Vec<EnrichedTransaction>,
    pub exploded: Vec<ExplodedRow>,
}

impl Dataset {
    /// Load a CSV file and run enrichment and explosion.
    ///
    /// Logs the start of the load, then either the success or the failure reason.
    pub fn load(path: &Path, categories: &CategoryMap) -> PipelineResult<Self> {
        log_info(format!("Loading data from csv file {}", path.display()));
        let result = load_transactions(path)
            .map_err(PipelineError::from)
            .and_then(|parsed| Self::from_parsed(parsed, Some(path), categories));
        report_load(result)
    }

    /// Same as [`Dataset::load`] for an in-memory CSV.
    pub fn from_bytes(bytes: &[u8], categories: &CategoryMap) -> PipelineResult<Self> {
        log_info(format!("Loading data from uploaded csv ({} bytes)", bytes.len()));
        let result = parse_transactions_bytes(bytes)
            .map_err(PipelineError::from)
            .and_then(|parsed| Self::from_parsed(parsed, None, categories));
        report_load(result)
    }

    /// Build the tables from already-parsed rows.
    pub fn from_parsed(
        parsed: ParseResult,
        path: Option<&Path>,
        categories: &CategoryMap,
    ) -> PipelineResult<Self> {
        let transactions = enrich(&parsed.records)?;
        let exploded = explode(&transactions, categories);

        Ok(Self {
            source: SourceInfo {
                path: path.map(|p| p.display().to_string()),
                encoding: parsed.encoding,
                delimiter: parsed.delimiter,
                headers: parsed.headers,
                row_count: parsed.records.len(),
            },
            transactions,
            exploded,
        })
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        available_years(&self.transactions)
    }

    /// Year shown when none is selected: the earliest one.
    pub fn default_year(&self) -> Option<i32> {
        self.years().first().copied()
    }
}

fn report_load(result: PipelineResult<Dataset>) -> PipelineResult<Dataset> {
    match &result {
        Ok(dataset) => log_success(format!(
            "Data loaded successfully: {} transactions, {} product lines",
            dataset.transactions.len(),
            dataset.exploded.len()
        )),
        Err(e) => log_error(format!("Error loading data: {}", e)),
    }
    result
}

/// Every dashboard section for one year selection.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub selected_year: Option<i32>,
    pub available_years: Vec<i32>,
    pub source: SourceInfo,
    pub kpi: Section<KpiSummary>,
    pub promotion_uplift: Vec<UpliftRow>,
    pub top_products_by_season: Vec<SeasonProductRow>,
    pub category_heatmap: CategoryHeatmap,
    pub customer_response: Vec<CustomerResponseRow>,
    pub channel_profit: ChannelProfit,
}

/// Run every analysis.
///
/// `year` drives the KPI section only; `None` picks [`Dataset::default_year`].
/// Recomputed from scratch on each call.
pub fn build_dashboard(dataset: &Dataset, year: Option<i32>) -> Dashboard {
    let available_years = dataset.years();
    let selected_year = year.or_else(|| available_years.first().copied());

    let kpi = match selected_year {
        Some(y) => {
            let summary = kpi_summary(&dataset.transactions, y);
            if let Section::Unavailable { reason } = &summary.top_promotion {
                log_warning(format!("Top promotion unavailable: {}", reason));
            }
            Section::Ready { data: summary }
        }
        None => Section::Unavailable {
            reason: "No year available".to_string(),
        },
    };

    Dashboard {
        selected_year,
        available_years,
        source: dataset.source.clone(),
        kpi,
        promotion_uplift: promotion_uplift(&dataset.transactions),
        top_products_by_season: top_products_by_season(&dataset.exploded),
        category_heatmap: category_heatmap(&dataset.exploded),
        customer_response: customer_response(&dataset.transactions),
        channel_profit: channel_profit(&dataset.exploded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;

    const SCENARIO: &str = "date,total_cost,total_items,product,promotion,customer_category,store_type,payment_method\n\
        2024-01-05,10,2,\"[Milk, Soap]\",BOGO,Student,Pharmacy,Cash\n\
        2024-01-06,5,1,[Milk],,Student,Pharmacy,Cash\n";

    #[test]
    fn test_scenario_dataset() {
        let dataset = Dataset::from_bytes(SCENARIO.as_bytes(), &CategoryMap::default()).unwrap();

        assert_eq!(dataset.transactions.len(), 2);
        assert_eq!(dataset.transactions[0].sales, 20.0);
        assert_eq!(dataset.transactions[1].sales, 5.0);
        assert_eq!(dataset.transactions[1].promotion, "None");
        assert_eq!(dataset.exploded.len(), 3);
        assert_eq!(dataset.source.row_count, 2);
        assert_eq!(dataset.default_year(), Some(2024));
    }

    #[test]
    fn test_scenario_dashboard() {
        let dataset = Dataset::from_bytes(SCENARIO.as_bytes(), &CategoryMap::default()).unwrap();
        let dashboard = build_dashboard(&dataset, None);

        assert_eq!(dashboard.selected_year, Some(2024));
        let kpi = dashboard.kpi.data().unwrap();
        assert_eq!(kpi.total_sales, 25.0);
        assert_eq!(kpi.top_promotion.data().unwrap().promotion, "BOGO");

        // BOGO 20 vs baseline 5 in the same customer/store
        assert_eq!(dashboard.promotion_uplift.len(), 1);
        assert_eq!(dashboard.promotion_uplift[0].uplift_pct, 300.0);
        assert_eq!(dashboard.customer_response.len(), 1);
    }

    #[test]
    fn test_enrichment_error_aborts_load() {
        let csv = "date,total_cost,total_items,product,promotion,customer_category,store_type,payment_method\n\
                   2024-01-05,10,2,Milk,BOGO,Student,Pharmacy,Cash\n";
        let err = Dataset::from_bytes(csv.as_bytes(), &CategoryMap::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Enrich(EnrichError::ProductList(_))));
    }

    #[test]
    fn test_dashboard_serializes() {
        let dataset = Dataset::from_bytes(SCENARIO.as_bytes(), &CategoryMap::default()).unwrap();
        let json = serde_json::to_value(build_dashboard(&dataset, Some(2030))).unwrap();

        assert_eq!(json["selected_year"], 2030);
        assert_eq!(json["kpi"]["status"], "ready");
        assert_eq!(json["kpi"]["data"]["top_promotion"]["status"], "unavailable");
        assert_eq!(json["category_heatmap"]["seasons"][0], "Winter");
    }
}
