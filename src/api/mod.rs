//! Client for the logs backend.
//!
//! Every `fetch_*`/`list_*` method makes exactly one GET and never fails:
//! errors are logged and replaced with the default shape for that view. The
//! `try_*` variants return the error instead, for callers that want to
//! surface it.

pub mod adapters;
mod models;

pub use models::*;

use chrono::Utc;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// API error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned HTTP {status} for {path}")]
    HttpStatus { path: String, status: u16 },
    #[error("invalid JSON from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Thin JSON-over-HTTP client for the backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Parse {
            path: path.to_string(),
            source,
        })
    }

    // ------------------------------------------------------------------------
    // Fallible fetches
    // ------------------------------------------------------------------------

    pub async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health").await
    }

    pub async fn try_fetch_metrics(&self) -> Result<MetricsSnapshot, ApiError> {
        self.get("/logs/metrics").await
    }

    pub async fn try_fetch_chart_data(&self) -> Result<ChartData, ApiError> {
        self.get("/logs/charts").await
    }

    pub async fn try_fetch_raw_logs(&self) -> Result<Vec<RawLogEntry>, ApiError> {
        self.get("/logs/all").await
    }

    pub async fn try_fetch_logs(&self) -> Result<Vec<LogRecord>, ApiError> {
        let raws = self.try_fetch_raw_logs().await?;
        Ok(adapters::adapt_logs(&raws))
    }

    /// Agents synthesized from the models seen in the log collection.
    pub async fn try_list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        let raws = self.try_fetch_raw_logs().await?;
        let models = adapters::distinct_models(&raws);
        Ok(adapters::synthesize_agents(&models, &mut rand::thread_rng()))
    }

    /// Prompts synthesized from the models seen in the log collection.
    pub async fn try_list_prompts(&self) -> Result<Vec<Prompt>, ApiError> {
        let raws = self.try_fetch_raw_logs().await?;
        let models = adapters::distinct_models(&raws);
        Ok(adapters::synthesize_prompts(
            &models,
            Utc::now(),
            &mut rand::thread_rng(),
        ))
    }

    /// Hourly activity for one agent.
    ///
    /// The backend has no per-agent endpoint; the log collection is still
    /// fetched so an unreachable backend yields empty graphs.
    pub async fn try_fetch_agent_details(&self, agent_id: &str) -> Result<AgentDetails, ApiError> {
        let _raws = self.try_fetch_raw_logs().await?;
        tracing::debug!("Synthesizing activity graphs for agent {}", agent_id);
        Ok(adapters::synthesize_agent_details(&mut rand::thread_rng()))
    }

    // ------------------------------------------------------------------------
    // Fetches with fallback
    // ------------------------------------------------------------------------

    pub async fn fetch_metrics(&self) -> MetricsSnapshot {
        or_default("metrics", self.try_fetch_metrics().await)
    }

    pub async fn fetch_chart_data(&self) -> ChartData {
        or_default("chart data", self.try_fetch_chart_data().await)
    }

    pub async fn fetch_logs(&self) -> Vec<LogRecord> {
        or_default("logs", self.try_fetch_logs().await)
    }

    pub async fn list_agents(&self) -> Vec<Agent> {
        or_default("agents", self.try_list_agents().await)
    }

    pub async fn list_prompts(&self) -> Vec<Prompt> {
        or_default("prompts", self.try_list_prompts().await)
    }

    pub async fn fetch_agent_details(&self, agent_id: &str) -> AgentDetails {
        or_default("agent details", self.try_fetch_agent_details(agent_id).await)
    }
}

fn or_default<T: Default>(what: &str, result: Result<T, ApiError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!("Error fetching {}: {}", what, e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::{backend, serve, unreachable_url};
    use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
    use serde_json::json;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_rejects_non_http_base_url() {
        assert!(matches!(ApiClient::new("localhost:8000"), Err(ApiError::Config(_))));
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_fetches_from_backend() {
        let client = ApiClient::new(&serve(backend()).await).unwrap();

        let health = assert_ok!(client.check_health().await);
        assert_eq!(health.status, "ok");

        let metrics = client.fetch_metrics().await;
        assert_eq!(metrics.avg_latency, "10600.00 ms");
        assert_eq!(metrics.errors, 1);

        let charts = client.fetch_chart_data().await;
        assert_eq!(charts.latency_trend.len(), 2);
        assert_eq!(charts.error_rate[1].errors, 1);

        let logs = client.fetch_logs().await;
        let statuses: Vec<_> = logs.iter().map(|l| l.status).collect();
        assert_eq!(statuses, vec![LogStatus::Success, LogStatus::Error, LogStatus::Timeout]);
        assert_eq!(logs[0].duration, "1.5");
        assert_eq!(logs[1].prompt, "N/A");

        let agents = client.list_agents().await;
        let names: Vec<_> = agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["gpt-4", "claude"]);

        let prompts = client.list_prompts().await;
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1].name, "claude Prompt");

        let details = client.fetch_agent_details("gpt-4").await;
        assert_eq!(details.usage_graph.len(), 24);
    }

    #[tokio::test]
    async fn test_network_failure_falls_back() {
        let client = ApiClient::new(&unreachable_url().await).unwrap();

        assert!(matches!(client.try_fetch_metrics().await, Err(ApiError::Network(_))));
        assert_eq!(client.fetch_metrics().await, MetricsSnapshot::default());

        let charts = client.fetch_chart_data().await;
        assert!(charts.latency_trend.is_empty());
        assert!(charts.token_usage.is_empty());
        assert!(charts.cost_progression.is_empty());
        assert!(charts.error_rate.is_empty());
        assert!(charts.user_activity.is_empty());

        assert!(client.fetch_logs().await.is_empty());
        assert!(client.list_agents().await.is_empty());
        assert!(client.list_prompts().await.is_empty());
        assert_eq!(client.fetch_agent_details("gpt-4").await, AgentDetails::default());
    }

    #[tokio::test]
    async fn test_http_status_failure_falls_back() {
        let router = Router::new().route(
            "/logs/metrics",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down").into_response() }),
        );
        let client = ApiClient::new(&serve(router).await).unwrap();

        match client.try_fetch_metrics().await {
            Err(ApiError::HttpStatus { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected HTTP status error, got {:?}", other),
        }
        assert_eq!(client.fetch_metrics().await, MetricsSnapshot::default());

        // Unrouted paths are 404s
        assert!(client.fetch_chart_data().await.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_falls_back() {
        let router = Router::new()
            .route("/logs/metrics", get(|| async { "not json" }))
            .route("/logs/all", get(|| async { Json(json!({"unexpected": "object"})) }));
        let client = ApiClient::new(&serve(router).await).unwrap();

        assert!(matches!(client.try_fetch_metrics().await, Err(ApiError::Parse { .. })));
        assert_eq!(client.fetch_metrics().await, MetricsSnapshot::default());
        assert!(client.fetch_logs().await.is_empty());
        assert!(client.list_agents().await.is_empty());
    }

    #[tokio::test]
    async fn test_loose_rows_keep_the_collection() {
        let router = Router::new().route(
            "/logs/all",
            get(|| async {
                Json(json!([
                    {"request_id": "a1", "http_status": 200, "model": "gpt-4",
                     "token_usage_total": 40, "timestamp": "2025-01-01T10:00:00"},
                    {"request_id": "", "http_status": 200, "model": "claude",
                     "token_usage_total": 5.0, "latency_ms": 250, "timestamp": null}
                ]))
            }),
        );
        let client = ApiClient::new(&serve(router).await).unwrap();

        let logs = assert_ok!(client.try_fetch_logs().await);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].id, "2");
        assert_eq!(logs[1].tokens, 5);
        assert_eq!(logs[1].duration, "0.3");
        assert_eq!(logs[1].timestamp, "");

        let names: Vec<_> = client.list_agents().await.into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["gpt-4", "claude"]);
    }
}
