use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::api::routes::{AlertsResponse, MetricsResponse, TimeseriesResponse, TransactionsResponse};
use crate::core::{AlertItem, DailyPoint, MetricsSummary, Transaction};
use crate::reports::ReportKind;

/// Simple client for the dashboard HTTP API.
pub struct DashboardClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, ClientError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, range: &RangeRequest) -> Result<T, ClientError> {
        let resp = self.get(path, &range.query_pairs()).await?;
        Ok(resp.json().await?)
    }

    pub async fn metrics(&self, range: &RangeRequest) -> Result<MetricsSummary, ClientError> {
        let resp: MetricsResponse = self.get_json("/metrics", range).await?;
        Ok(resp.summary)
    }

    /// Transactions in the range, filtered server-side when `range.q` is set.
    pub async fn transactions(&self, range: &RangeRequest) -> Result<Vec<Transaction>, ClientError> {
        let resp: TransactionsResponse = self.get_json("/transactions", range).await?;
        Ok(resp.data)
    }

    pub async fn alerts(&self, range: &RangeRequest) -> Result<Vec<AlertItem>, ClientError> {
        let resp: AlertsResponse = self.get_json("/alerts", range).await?;
        Ok(resp.alerts)
    }

    pub async fn timeseries(&self, range: &RangeRequest) -> Result<Vec<DailyPoint>, ClientError> {
        let resp: TimeseriesResponse = self.get_json("/timeseries", range).await?;
        Ok(resp.points)
    }

    /// Download a CSV report.
    pub async fn report(&self, kind: ReportKind, range: &RangeRequest) -> Result<String, ClientError> {
        let resp = self
            .get(&format!("/reports/{kind}"), &range.query_pairs())
            .await?;
        Ok(resp.text().await?)
    }
}

/// Query parameters shared by every range endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRequest {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Server default when unset.
    pub seed: Option<i64>,
    /// Search filter, only honored by `/transactions`.
    pub q: Option<String>,
}

impl RangeRequest {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            seed: None,
            q: None,
        }
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", self.from.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("to", self.to.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        if let Some(seed) = self.seed {
            pairs.push(("seed", seed.to_string()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        pairs
    }
}
