//! REST API types for the dashboard front end.
//!
//! Analysis tables are returned as-is; each response is tagged with a
//! report id so the front end can correlate it with log lines.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transform::pipeline::Dashboard;

/// Response for one analysis table or the full dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse<T> {
    /// Unique report identifier
    pub report_id: String,

    /// Always "ready"; failures use [`error_response`]
    pub status: String,

    pub data: T,
}

impl<T> ReportResponse<T> {
    pub fn ready(data: T) -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            data,
        }
    }
}

/// Dashboard response with a short metadata block
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub report_id: String,
    pub status: String,
    pub metadata: DashboardMetadata,
    pub dashboard: Dashboard,
}

/// Counts shown next to the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
    pub transactions: usize,
    pub selected_year: Option<i32>,
    pub available_years: Vec<i32>,
    pub columns: Vec<String>,
    pub encoding: String,
    pub delimiter: String,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        // "warning" when a section could not be computed
        let kpi_ready = dashboard
            .kpi
            .data()
            .map(|k| k.top_promotion.is_ready())
            .unwrap_or(false);

        DashboardResponse {
            report_id: Uuid::new_v4().to_string(),
            status: if kpi_ready { "ready" } else { "warning" }.to_string(),
            metadata: DashboardMetadata {
                transactions: dashboard.source.row_count,
                selected_year: dashboard.selected_year,
                available_years: dashboard.available_years.clone(),
                columns: dashboard.source.headers.clone(),
                encoding: dashboard.source.encoding.clone(),
                delimiter: dashboard.source.delimiter.to_string(),
            },
            dashboard,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "reportId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
