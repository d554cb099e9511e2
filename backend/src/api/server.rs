//! HTTP Server for the retail promotions dashboard.
//!
//! Serves the analysis tables of the dataset loaded at startup.
//!
//! # API Endpoints
//!
//! | Method | Path                      | Description                               |
//! |--------|---------------------------|-------------------------------------------|
//! | GET    | `/health`                 | Health check                              |
//! | GET    | `/api/years`              | Years available for the selector          |
//! | GET    | `/api/dashboard?year=Y`   | Every section for one year                |
//! | GET    | `/api/kpi?year=Y`         | KPI summary                               |
//! | GET    | `/api/uplift`             | Promotion uplift by customer and store    |
//! | GET    | `/api/top-products`       | Top 3 products per season                 |
//! | GET    | `/api/heatmap`            | Profit by season and category             |
//! | GET    | `/api/customer-response`  | Best promotion per customer category      |
//! | GET    | `/api/channels`           | Profit by store type and payment method   |
//! | POST   | `/api/analyze?year=Y`     | Dashboard for an uploaded CSV (not kept)  |
//! | GET    | `/api/logs`               | SSE stream of operator logs               |
//!
//! When the startup load failed, every analysis endpoint answers 503 with
//! the load error.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{error_response, DashboardResponse, ReportResponse};
use crate::analysis::{
    category_heatmap, channel_profit, customer_response, kpi_summary, promotion_uplift,
    top_products_by_season, CategoryHeatmap, ChannelProfit, CustomerResponseRow, KpiSummary,
    SeasonProductRow, UpliftRow,
};
use crate::catalog::CategoryMap;
use crate::config::MAX_UPLOAD_BYTES;
use crate::error::{PipelineResult, ServerError};
use crate::transform::pipeline::{build_dashboard, Dataset};

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Result<Dataset, String>>,
    categories: Arc<CategoryMap>,
}

impl AppState {
    /// Keeps a failed load so every request can report it.
    pub fn new(dataset: PipelineResult<Dataset>, categories: CategoryMap) -> Self {
        Self {
            dataset: Arc::new(dataset.map_err(|e| e.to_string())),
            categories: Arc::new(categories),
        }
    }

    fn dataset(&self) -> Result<&Dataset, ApiError> {
        self.dataset.as_ref().as_ref().map_err(|e| {
            (StatusCode::SERVICE_UNAVAILABLE, Json(error_response(e)))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Build the router for `state`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/years", get(years))
        .route("/api/dashboard", get(dashboard))
        .route("/api/kpi", get(kpi))
        .route("/api/uplift", get(uplift))
        .route("/api/top-products", get(top_products))
        .route("/api/heatmap", get(heatmap))
        .route("/api/customer-response", get(customer_response_handler))
        .route("/api/channels", get(channels))
        .route("/api/analyze", post(analyze_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, state: AppState) -> Result<(), ServerError> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("cannot bind {}: {}", addr, e)))?;
    log_info(format!("Retail promo server running on http://localhost:{}", port));

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let (status, error) = match state.dataset.as_ref() {
        Ok(_) => ("ok", None),
        Err(e) => ("degraded", Some(e.clone())),
    };
    Json(json!({
        "status": status,
        "service": "retail-promo",
        "version": env!("CARGO_PKG_VERSION"),
        "error": error,
    }))
}

async fn years(State(state): State<AppState>) -> ApiResult<ReportResponse<Vec<i32>>> {
    let dataset = state.dataset()?;
    Ok(Json(ReportResponse::ready(dataset.years())))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<DashboardResponse> {
    let dataset = state.dataset()?;
    Ok(Json(build_dashboard(dataset, query.year).into()))
}

async fn kpi(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<ReportResponse<KpiSummary>> {
    let dataset = state.dataset()?;
    let year = query
        .year
        .or_else(|| dataset.default_year())
        .ok_or_else(|| bad_request(ServerError::BadRequest("no year available".into())))?;
    Ok(Json(ReportResponse::ready(kpi_summary(&dataset.transactions, year))))
}

async fn uplift(State(state): State<AppState>) -> ApiResult<ReportResponse<Vec<UpliftRow>>> {
    let dataset = state.dataset()?;
    Ok(Json(ReportResponse::ready(promotion_uplift(&dataset.transactions))))
}

async fn top_products(
    State(state): State<AppState>,
) -> ApiResult<ReportResponse<Vec<SeasonProductRow>>> {
    let dataset = state.dataset()?;
    Ok(Json(ReportResponse::ready(top_products_by_season(&dataset.exploded))))
}

async fn heatmap(State(state): State<AppState>) -> ApiResult<ReportResponse<CategoryHeatmap>> {
    let dataset = state.dataset()?;
    Ok(Json(ReportResponse::ready(category_heatmap(&dataset.exploded))))
}

async fn customer_response_handler(
    State(state): State<AppState>,
) -> ApiResult<ReportResponse<Vec<CustomerResponseRow>>> {
    let dataset = state.dataset()?;
    Ok(Json(ReportResponse::ready(customer_response(&dataset.transactions))))
}

async fn channels(State(state): State<AppState>) -> ApiResult<ReportResponse<ChannelProfit>> {
    let dataset = state.dataset()?;
    Ok(Json(ReportResponse::ready(channel_profit(&dataset.exploded))))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Run the pipeline on an uploaded CSV. Nothing is stored.
async fn analyze_csv(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
    mut multipart: Multipart,
) -> ApiResult<DashboardResponse> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(ServerError::BadRequest(format!("Multipart error: {}", e))))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(ServerError::BadRequest(format!("Read error: {}", e))))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request(ServerError::BadRequest("No file provided".into())))?;

    let dataset = Dataset::from_bytes(&bytes, &state.categories).map_err(|e| {
        let err = ServerError::from(e);
        (StatusCode::UNPROCESSABLE_ENTITY, Json(error_response(&err.to_string())))
    })?;

    Ok(Json(build_dashboard(&dataset, query.year).into()))
}

fn bad_request(err: ServerError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DataLoadError, PipelineError};

    const CSV: &str = "date,total_cost,total_items,product,promotion,customer_category,store_type,payment_method\n\
        2023-01-05,10,2,['Milk'],BOGO,Student,Pharmacy,Cash\n\
        2024-01-06,5,1,['Milk'],,Student,Pharmacy,Cash\n";

    fn loaded_state() -> AppState {
        let dataset = Dataset::from_bytes(CSV.as_bytes(), &CategoryMap::default());
        AppState::new(dataset, CategoryMap::default())
    }

    #[tokio::test]
    async fn test_years_endpoint() {
        let Json(response) = years(State(loaded_state())).await.unwrap();
        assert_eq!(response.data, vec![2023, 2024]);
        assert_eq!(response.status, "ready");
    }

    #[tokio::test]
    async fn test_kpi_uses_requested_year() {
        let Json(response) = kpi(State(loaded_state()), Query(YearQuery { year: Some(2024) }))
            .await
            .unwrap();
        assert_eq!(response.data.year, 2024);
        assert_eq!(response.data.total_sales, 5.0);
        assert!(!response.data.top_promotion.is_ready());
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let state = AppState::new(
            Err(PipelineError::Load(DataLoadError::EmptyFile)),
            CategoryMap::default(),
        );

        let (status, Json(body)) = uplift(State(state.clone())).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("empty"));

        let Json(health) = health(State(state)).await;
        assert_eq!(health["status"], "degraded");
    }

    #[tokio::test]
    async fn test_port_in_use_is_internal_error() {
        let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = start_server(port, loaded_state()).await.unwrap_err();
        assert!(matches!(err, ServerError::Internal(ref msg) if msg.contains("cannot bind")));
    }
}
