//! # Retail Promo - promotion uplift and profitability tables
//!
//! Turns a retail transaction CSV into the tables behind the promotions
//! dashboard: KPIs, promotion uplift, seasonal product rankings, a
//! season × category profit heatmap, customer response and channel profit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│  Analysis   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (enrich +   │     │ (dashboard  │
//! │             │     │             │     │  explode)   │     │  sections)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use retail_promo::{build_dashboard, CategoryMap, Dataset};
//!
//! let dataset = Dataset::load("retail_promo.csv".as_ref(), &CategoryMap::default())?;
//! let dashboard = build_dashboard(&dataset, None);
//! println!("{} product lines", dataset.exploded.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Transaction rows and seasons
//! - [`parser`] - CSV loading with auto-detection
//! - [`catalog`] - Product → category map
//! - [`transform`] - Enrichment, explosion and the dataset pipeline
//! - [`analysis`] - Dashboard aggregations
//! - [`validation`] - JSON Schema validation of the category map
//! - [`config`] - Runtime settings
//! - [`format`] - Compact currency / number formatting
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod config;

// Parsing
pub mod parser;

// Categories
pub mod catalog;

// Transformation
pub mod transform;

// Analyses
pub mod analysis;

// Validation
pub mod validation;

// Output
pub mod format;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError,
    ConfigError,
    DataLoadError,
    DateParseError,
    EnrichError,
    PipelineError,
    ProductListParseError,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    EnrichedTransaction,
    ExplodedRow,
    RawTransaction,
    Season,
    NO_PROMOTION,
    REQUIRED_COLUMNS,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    load_transactions,
    parse_transactions_bytes,
    parse_transactions_str,
    parse_product_list,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParseResult,
};

// =============================================================================
// Re-exports - Categories & Validation
// =============================================================================

pub use catalog::{Category, CategoryMap};

pub use validation::{validate, validate_category_map};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    enrich,
    explode,
    build_dashboard,
    Dashboard,
    Dataset,
    SourceInfo,
};

// =============================================================================
// Re-exports - Analyses
// =============================================================================

pub use analysis::{
    available_years,
    category_heatmap,
    channel_profit,
    customer_response,
    kpi_summary,
    promotion_uplift,
    top_n_within_groups,
    top_products_by_season,
    top_promotion,
    CategoryHeatmap,
    ChannelProfit,
    CustomerResponseRow,
    KpiSummary,
    SeasonProductRow,
    Section,
    TopPromotion,
    UpliftRow,
};

// =============================================================================
// Re-exports - Config & Formatting
// =============================================================================

pub use config::Settings;
pub use format::{format_currency, format_number};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    DashboardMetadata,
    DashboardResponse,
    ReportResponse,
    error_response,
};

// Server
pub mod server {
    pub use crate::api::server::{start_server, AppState};
}
