//! Error types for the retail promotions pipeline.
//!
//! - [`DataLoadError`] - CSV source unreadable, missing columns, malformed rows
//! - [`ProductListParseError`] / [`DateParseError`] - enrichment failures
//! - [`EnrichError`] - either of the two above
//! - [`AnalysisError`] - per-analysis failures (reported, not fatal)
//! - [`ConfigError`] - settings and category map errors
//! - [`PipelineError`] - top-level load + enrichment orchestration
//! - [`ServerError`] - HTTP surface
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading the raw transaction CSV.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read file.
    #[error("Failed to read data source: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode data source: {0}")]
    Encoding(String),

    /// Empty file.
    #[error("Data source is empty")]
    EmptyFile,

    /// Header present but no data rows.
    #[error("Data source has no transaction rows")]
    NoRecords,

    /// Required columns absent from the header.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A row could not be deserialized.
    #[error("Malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

// =============================================================================
// Enrichment Errors
// =============================================================================

/// A `product` cell is not a valid serialized list.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Row {row}: invalid product list {value:?}: {reason}")]
pub struct ProductListParseError {
    /// 0-based index of the transaction row.
    pub row: usize,
    pub value: String,
    pub reason: String,
}

/// A `date` cell could not be parsed.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Row {row}: unparseable date {value:?}")]
pub struct DateParseError {
    /// 0-based index of the transaction row.
    pub row: usize,
    pub value: String,
}

/// Errors during the enrichment stage.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnrichError {
    #[error(transparent)]
    ProductList(#[from] ProductListParseError),

    #[error(transparent)]
    Date(#[from] DateParseError),
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Errors local to a single analysis. The rest of the dashboard still renders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// No non-baseline promotion rows for the selected year.
    #[error("No promotion data for year {year}")]
    NoPromotionData { year: i32 },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors from settings resolution and the category map file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Category map failed schema validation.
    #[error("Category map does not match schema: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// Same product listed under two categories.
    #[error("Product '{product}' is listed under both '{first}' and '{second}'")]
    DuplicateProduct {
        product: String,
        first: String,
        second: String,
    },

    /// Invalid environment / flag value.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Load-time errors. Any of these aborts the whole dashboard.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source could not be loaded.
    #[error("Data loading failed: {0}")]
    Load(#[from] DataLoadError),

    /// Enrichment failed on a row.
    #[error("Data loading failed: {0}")]
    Enrich(#[from] EnrichError),

    /// Category map could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ProductListParseError> for PipelineError {
    fn from(err: ProductListParseError) -> Self {
        PipelineError::Enrich(err.into())
    }
}

impl From<DateParseError> for PipelineError {
    fn from(err: DateParseError) -> Self {
        PipelineError::Enrich(err.into())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, DataLoadError>;

/// Result type for enrichment.
pub type EnrichResult<T> = Result<T, EnrichError>;

/// Result type for a single analysis.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // DataLoadError -> PipelineError
        let pipeline_err: PipelineError = DataLoadError::EmptyFile.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // DateParseError -> PipelineError
        let date_err = DateParseError { row: 3, value: "yesterday".into() };
        let pipeline_err: PipelineError = date_err.into();
        assert!(matches!(pipeline_err, PipelineError::Enrich(EnrichError::Date(_))));
        assert!(pipeline_err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_missing_columns_format() {
        let err = DataLoadError::MissingColumns(vec!["date".into(), "product".into()]);
        assert_eq!(err.to_string(), "Missing required column(s): date, product");
    }

    #[test]
    fn test_product_list_error_format() {
        let err = ProductListParseError {
            row: 7,
            value: "Milk, Soap".into(),
            reason: "expected '['".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("Milk, Soap"));
        assert!(msg.contains("expected '['"));
    }

    #[test]
    fn test_no_promotion_data_format() {
        let err = AnalysisError::NoPromotionData { year: 2021 };
        assert_eq!(err.to_string(), "No promotion data for year 2021");
    }
}
