use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::ApiError;
use super::query::{RangeParams, ResolvedRange};
use crate::core::generator::generate;
use crate::core::metrics::{aggregate, daily_series};
use crate::core::{AlertItem, DailyPoint, MetricsSummary, Transaction, matches_query};
use crate::reports::{ReportKind, render_report};
use crate::signals::detect;

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub data: Vec<Transaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub summary: MetricsSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimeseriesResponse {
    pub points: Vec<DailyPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/transactions", get(transactions_handler))
        .route("/alerts", get(alerts_handler))
        .route("/metrics", get(metrics_handler))
        .route("/timeseries", get(timeseries_handler))
        .route("/reports/{kind}", get(report_handler))
}

/// Resolve the query range and generate its transactions.
fn load(state: &AppState, params: &RangeParams) -> Result<(ResolvedRange, Vec<Transaction>), ApiError> {
    let range = params.resolve(&state.config.generator, Utc::now())?;
    let txs = generate(range.from, range.to, range.seed, state.config.generator.max_per_day);
    tracing::debug!(
        from = %range.from,
        to = %range.to,
        seed = range.seed,
        count = txs.len(),
        "Range loaded"
    );
    Ok((range, txs))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /transactions - generated transactions, optionally filtered by `q`.
async fn transactions_handler(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let (_, txs) = load(&state, &params)?;
    let query = params.query();
    let data = txs.into_iter().filter(|tx| matches_query(tx, query)).collect();
    Ok(Json(TransactionsResponse { data }))
}

/// GET /alerts - under-remittance alerts over the range.
async fn alerts_handler(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let (_, txs) = load(&state, &params)?;
    let alerts = detect(&txs, state.config.alerts.threshold);
    Ok(Json(AlertsResponse { alerts }))
}

/// GET /metrics - aggregate summary over the range.
async fn metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let (_, txs) = load(&state, &params)?;
    Ok(Json(MetricsResponse {
        summary: aggregate(&txs),
    }))
}

/// GET /timeseries - per-day declared/remitted/occupancy.
async fn timeseries_handler(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TimeseriesResponse>, ApiError> {
    let (_, txs) = load(&state, &params)?;
    Ok(Json(TimeseriesResponse {
        points: daily_series(&txs),
    }))
}

/// GET /reports/{kind} - CSV download.
async fn report_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let kind: ReportKind = kind.parse()?;
    let (range, txs) = load(&state, &params)?;
    let body = render_report(kind, &txs, state.config.alerts.threshold)?;
    tracing::info!(%kind, seed = range.seed, rows = txs.len(), "Report generated");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", kind.file_name()),
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::config::Config;
    use super::*;

    async fn get_uri(uri: &str) -> Response {
        build_router(Arc::new(Config::default()))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let resp = get_uri("/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn transactions_single_day() {
        let resp = get_uri("/transactions?from=2024-01-01&to=2024-01-01&seed=42").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: TransactionsResponse = serde_json::from_value(json_body(resp).await).unwrap();
        let start = crate::api::query::parse_timestamp("2024-01-01").unwrap();
        let expected = generate(start, start, 42, 60);
        assert_eq!(body.data.len(), expected.len());
        for (got, want) in body.data.iter().zip(&expected) {
            assert_eq!(got.id, want.id);
            assert_eq!(got.date, want.date);
            assert_eq!(got.stream, want.stream);
            assert!((got.amount_declared - want.amount_declared).abs() < 1e-6);
        }
        assert!((10..70).contains(&body.data.len()));
    }

    #[tokio::test]
    async fn transactions_default_range_spans_thirty_days() {
        let resp = get_uri("/transactions").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: TransactionsResponse = serde_json::from_value(json_body(resp).await).unwrap();
        // 30 days of at least 10 records each
        assert!(body.data.len() >= 300);
    }

    #[tokio::test]
    async fn transactions_filtered_by_query() {
        let resp = get_uri("/transactions?from=2024-01-01&to=2024-01-03&q=WALLET").await;
        let body: TransactionsResponse = serde_json::from_value(json_body(resp).await).unwrap();
        assert!(!body.data.is_empty());
        assert!(body.data.iter().all(|t| t.payment_method.as_str() == "wallet"));
    }

    #[tokio::test]
    async fn alerts_match_detector() {
        let resp = get_uri("/alerts?from=2024-01-01&to=2024-01-10&seed=7").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: AlertsResponse = serde_json::from_value(json_body(resp).await).unwrap();
        let from = crate::api::query::parse_timestamp("2024-01-01").unwrap();
        let to = crate::api::query::parse_timestamp("2024-01-10").unwrap();
        let expected = detect(&generate(from, to, 7, 60), 0.08);
        let ids: Vec<&str> = body.alerts.iter().map(|a| a.id.as_str()).collect();
        let expected_ids: Vec<&str> = expected.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, expected_ids);
    }

    #[tokio::test]
    async fn metrics_summary_shape() {
        let resp = get_uri("/metrics?from=2024-01-01&to=2024-01-05").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        let summary = &body["summary"];
        assert_eq!(summary["byStream"].as_object().unwrap().len(), 6);
        assert_eq!(summary["byPaymentMethod"].as_object().unwrap().len(), 4);
        assert!(summary["totalDeclared"].as_f64().unwrap() > 0.0);
        assert!(summary["remittanceVariance"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn reversed_range_is_empty_not_error() {
        let resp = get_uri("/metrics?from=2024-02-01&to=2024-01-01").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: MetricsResponse = serde_json::from_value(json_body(resp).await).unwrap();
        assert_eq!(body.summary.total_declared, 0.0);
        assert_eq!(body.summary.from, body.summary.to);
    }

    #[tokio::test]
    async fn timeseries_one_point_per_day() {
        let resp = get_uri("/timeseries?from=2024-01-01&to=2024-01-07").await;
        let body: TimeseriesResponse = serde_json::from_value(json_body(resp).await).unwrap();
        assert_eq!(body.points.len(), 7);
        assert!(body.points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let resp = get_uri("/alerts?from=yesterday").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("from"));
    }

    #[tokio::test]
    async fn unbounded_range_is_bad_request() {
        let resp = get_uri("/transactions?from=0001-01-01&to=9999-12-31").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("limit is 366"));

        let resp = get_uri("/reports/transactions?from=2020-01-01&to=2024-01-01").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_seed_is_bad_request() {
        let resp = get_uri("/transactions?seed=forty-two").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_is_csv_attachment() {
        let resp = get_uri("/reports/revenue?from=2024-01-01&to=2024-01-02").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"revenue-report.csv\""
        );
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("stream,declared,remitted,variance"));
        assert_eq!(text.lines().count(), 7);
    }

    #[tokio::test]
    async fn unknown_report_is_not_found() {
        let resp = get_uri("/reports/pdf").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
