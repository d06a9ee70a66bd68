//! Fake logs backend for tests.

use crate::api::ApiClient;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub async fn unreachable_client() -> ApiClient {
    ApiClient::new(&unreachable_url().await).unwrap()
}

/// Three requests over two models: a success, an error and a timeout.
pub fn sample_logs() -> Value {
    json!([
        {
            "request_id": "a1", "is_error": false, "http_status": 200, "model": "gpt-4",
            "user_message_length": 12, "latency_ms": 1500, "token_usage_total": 90,
            "cost_usd": 0.002, "timestamp": "2025-01-01T10:00:00"
        },
        {
            "request_id": "a2", "is_error": true, "http_status": 500, "model": "gpt-4",
            "user_message_length": 0, "latency_ms": 300, "token_usage_total": 0,
            "cost_usd": 0.0, "timestamp": "2025-01-01T10:01:00"
        },
        {
            "request_id": "a3", "is_error": false, "http_status": 504, "model": "claude",
            "user_message_length": 5, "latency_ms": 30000, "token_usage_total": 10,
            "cost_usd": 0.0001, "timestamp": "2025-01-01T10:02:00"
        }
    ])
}

pub fn sample_metrics() -> Value {
    json!({
        "avgLatency": "10600.00 ms",
        "costToday": "$0.0021",
        "tokenUsage": "40 prompt / 60 completion",
        "errors": 1,
        "retryRate": "2",
        "activeUsers": "3"
    })
}

pub fn sample_charts() -> Value {
    json!({
        "latencyTrend": [{"time": "t1", "latency": 1500}, {"time": "t2", "latency": 300}],
        "tokenUsage": [{"time": "t1", "prompt": 40, "completion": 50}],
        "costProgression": [{"time": "t1", "cost": 0.002}],
        "errorRate": [{"time": "t1", "errors": 0}, {"time": "t2", "errors": 1}],
        "userActivity": [{"time": "t1", "users": 3}]
    })
}

/// Router answering every endpoint the dashboard consumes.
pub fn backend() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok", "timestamp": "now"})) }))
        .route("/logs/metrics", get(|| async { Json(sample_metrics()) }))
        .route("/logs/charts", get(|| async { Json(sample_charts()) }))
        .route("/logs/all", get(|| async { Json(sample_logs()) }))
}

/// Like [`backend`], but `/logs/all` answers 503 until the returned flag is
/// set.
pub fn recovering_backend() -> (Router, Arc<AtomicBool>) {
    let up = Arc::new(AtomicBool::new(false));
    let flag = up.clone();
    let router = Router::new().route(
        "/logs/all",
        get(move || {
            let up = flag.load(Ordering::SeqCst);
            async move {
                if up {
                    Json(sample_logs()).into_response()
                } else {
                    (StatusCode::SERVICE_UNAVAILABLE, "starting").into_response()
                }
            }
        }),
    );
    (router, up)
}
