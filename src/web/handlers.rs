//! HTTP request handlers.

use super::AppState;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde::Deserialize;

// ============================================================================
// Templates
// ============================================================================

const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
const DASHBOARD_TEMPLATE: &str = include_str!("templates/dashboard.html");
const AGENTS_TEMPLATE: &str = include_str!("templates/agents.html");
const PROMPTS_TEMPLATE: &str = include_str!("templates/prompts.html");
const LOGS_TEMPLATE: &str = include_str!("templates/logs.html");

fn render_page(title: &str, content: &str) -> Html<String> {
    Html(
        LAYOUT_TEMPLATE
            .replace("{{title}}", title)
            .replace("{{content}}", content),
    )
}

/// Serialize for embedding in a `<script>` block.
fn to_script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

// ============================================================================
// Pages
// ============================================================================

pub async fn handle_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = state.dashboard.metrics.state();
    let charts = state.dashboard.charts.state();

    let content = DASHBOARD_TEMPLATE
        .replace("{{metrics_json}}", &to_script_json(&metrics))
        .replace("{{charts_json}}", &to_script_json(&charts))
        .replace(
            "{{metrics_interval_ms}}",
            &state.config.metrics_interval.as_millis().to_string(),
        )
        .replace(
            "{{charts_interval_ms}}",
            &state.config.charts_interval.as_millis().to_string(),
        );

    render_page("Agent Monitor", &content)
}

/// Every visit remounts the view, like a page load.
pub async fn handle_agents_page(State(state): State<AppState>) -> impl IntoResponse {
    state.dashboard.agents.refresh().await;
    let agents = state.dashboard.agents.state().await;
    let content = AGENTS_TEMPLATE.replace("{{agents_json}}", &to_script_json(&agents));
    render_page("Agents", &content)
}

/// Every visit remounts the view, which discards local edits.
pub async fn handle_prompts_page(State(state): State<AppState>) -> impl IntoResponse {
    state.dashboard.prompts.refresh().await;
    let prompts = state.dashboard.prompts.state().await;
    let content = PROMPTS_TEMPLATE.replace("{{prompts_json}}", &to_script_json(&prompts));
    render_page("Prompts", &content)
}

pub async fn handle_logs_page() -> impl IntoResponse {
    render_page("Request Logs", LOGS_TEMPLATE)
}

// ============================================================================
// API: Dashboard panels
// ============================================================================

pub async fn handle_get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.metrics.state())
}

pub async fn handle_get_charts(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.charts.state())
}

// ============================================================================
// API: Logs
// ============================================================================

pub async fn handle_get_logs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.logs.state().await)
}

pub async fn handle_refresh_logs(State(state): State<AppState>) -> impl IntoResponse {
    state.dashboard.logs.refresh().await;
    (StatusCode::ACCEPTED, Json(state.dashboard.logs.state().await))
}

// ============================================================================
// API: Agents
// ============================================================================

pub async fn handle_get_agents(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.agents.state().await)
}

pub async fn handle_refresh_agents(State(state): State<AppState>) -> impl IntoResponse {
    state.dashboard.agents.refresh().await;
    (StatusCode::ACCEPTED, Json(state.dashboard.agents.state().await))
}

pub async fn handle_select_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.dashboard.agents.select(&id).await {
        Some(detail) => Json(detail).into_response(),
        None => (StatusCode::NOT_FOUND, "Agent not found").into_response(),
    }
}

// ============================================================================
// API: Prompts
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SavePromptRequest {
    pub text: String,
}

pub async fn handle_get_prompts(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.prompts.state().await)
}

pub async fn handle_refresh_prompts(State(state): State<AppState>) -> impl IntoResponse {
    state.dashboard.prompts.refresh().await;
    (StatusCode::ACCEPTED, Json(state.dashboard.prompts.state().await))
}

pub async fn handle_get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.dashboard.prompts.get(&id).await {
        Some(prompt) => Json(prompt).into_response(),
        None => (StatusCode::NOT_FOUND, "Prompt not found").into_response(),
    }
}

pub async fn handle_save_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SavePromptRequest>,
) -> impl IntoResponse {
    match state.dashboard.prompts.save(&id, &req.text).await {
        Some(prompt) => Json(prompt).into_response(),
        None => (StatusCode::NOT_FOUND, "Prompt not found").into_response(),
    }
}

pub async fn handle_get_prompt_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.dashboard.prompts.history(&id).await {
        Some(history) => Json(history).into_response(),
        None => (StatusCode::NOT_FOUND, "Prompt not found").into_response(),
    }
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_favicon() -> impl IntoResponse {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <rect x="5" y="5" width="90" height="90" rx="20" fill="#3b82f6"/>
        <path d="M20 60 L38 42 L52 56 L80 28" stroke="white" stroke-width="8" fill="none"/>
    </svg>"##;

    ([(axum::http::header::CONTENT_TYPE, "image/svg+xml")], svg)
}

#[cfg(test)]
mod tests {
    use crate::api::ApiClient;
    use crate::config::DashboardConfig;
    use crate::test_utils::{backend, recovering_backend, serve};
    use crate::views::Dashboard;
    use crate::web::Server;

    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    /// Dashboard server backed by the fake backend; returns its base URL.
    async fn dashboard_url() -> (String, Arc<Dashboard>) {
        let cfg = DashboardConfig::default();
        let client = ApiClient::new(&serve(backend()).await).unwrap();
        let dashboard = Arc::new(Dashboard::mount(client, &cfg));

        dashboard.metrics.poller().loaded().await.unwrap();
        dashboard.agents.list_loaded().await.unwrap();
        dashboard.prompts.list_loaded().await.unwrap();

        let server = Server::new(cfg, dashboard.clone());
        (serve(server.routes()).await, dashboard)
    }

    async fn get_json(url: &str) -> (u16, Value) {
        let resp = reqwest::get(url).await.unwrap();
        let status = resp.status().as_u16();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_metrics_and_charts_endpoints() {
        let (url, _dashboard) = dashboard_url().await;

        let (status, metrics) = get_json(&format!("{}/api/metrics", url)).await;
        assert_eq!(status, 200);
        assert_eq!(metrics["loading"], json!(false));
        assert_eq!(metrics["data"]["avgLatency"], json!("10600.00 ms"));
        assert_eq!(metrics["lastError"], Value::Null);

        let (status, charts) = get_json(&format!("{}/api/charts", url)).await;
        assert_eq!(status, 200);
        if charts["loading"] == json!(false) {
            assert_eq!(charts["data"]["latencyTrend"].as_array().map(Vec::len), Some(2));
        }
    }

    #[tokio::test]
    async fn test_agent_selection() {
        let (url, _dashboard) = dashboard_url().await;

        let (_, agents) = get_json(&format!("{}/api/agents", url)).await;
        assert_eq!(agents["list"]["data"][0]["id"], json!("gpt-4"));
        assert_eq!(agents["selected"], Value::Null);

        let (status, detail) = get_json(&format!("{}/api/agents/claude", url)).await;
        assert_eq!(status, 200);
        assert_eq!(detail["agent"]["name"], json!("claude"));

        let (_, agents) = get_json(&format!("{}/api/agents", url)).await;
        assert_eq!(agents["selected"]["id"], json!("claude"));

        let (status, _) = get_json(&format!("{}/api/agents/nobody", url)).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_save_prompt() {
        let (url, _dashboard) = dashboard_url().await;
        let http = reqwest::Client::new();

        let (_, before) = get_json(&format!("{}/api/prompts/gpt-4", url)).await;
        let version = before["version"].as_u64().unwrap();

        let resp = http
            .put(format!("{}/api/prompts/gpt-4", url))
            .json(&json!({"text": "Be brief."}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let saved: Value = resp.json().await.unwrap();
        assert_eq!(saved["version"].as_u64(), Some(version + 1));
        assert_eq!(saved["text"], json!("Be brief."));

        let (_, prompts) = get_json(&format!("{}/api/prompts", url)).await;
        assert_eq!(prompts["data"][0]["text"], json!("Be brief."));

        let (_, history) = get_json(&format!("{}/api/prompts/gpt-4/history", url)).await;
        assert_eq!(history.as_array().map(Vec::len), Some(5));

        let missing = http
            .put(format!("{}/api/prompts/nope", url))
            .json(&json!({"text": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        let malformed = http
            .put(format!("{}/api/prompts/gpt-4", url))
            .header("content-type", "application/json")
            .body("{\"txt\": 1}")
            .send()
            .await
            .unwrap();
        assert!(malformed.status().is_client_error());
    }

    #[tokio::test]
    async fn test_logs_endpoints() {
        let (url, dashboard) = dashboard_url().await;
        dashboard.logs.loaded().await.unwrap();

        let (_, logs) = get_json(&format!("{}/api/logs", url)).await;
        assert_eq!(logs["data"][1]["status"], json!("error"));
        assert_eq!(logs["data"][2]["status"], json!("timeout"));

        let resp = reqwest::Client::new()
            .post(format!("{}/api/logs/refresh", url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 202);
    }

    #[tokio::test]
    async fn test_page_visit_refetches_lists() {
        let (router, up) = recovering_backend();
        let cfg = DashboardConfig::default();
        let client = ApiClient::new(&serve(router).await).unwrap();
        let dashboard = Arc::new(Dashboard::mount(client, &cfg));
        let url = serve(Server::new(cfg, dashboard.clone()).routes()).await;

        let agents = dashboard.agents.list_loaded().await.unwrap();
        assert_eq!(agents.data, Some(Vec::new()));
        dashboard.prompts.list_loaded().await.unwrap();

        up.store(true, Ordering::SeqCst);

        let resp = reqwest::get(format!("{}/agents", url)).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let agents = dashboard.agents.list_loaded().await.unwrap();
        assert_eq!(agents.data.map(|a| a.len()), Some(2));
        assert!(agents.last_error.is_none());

        let resp = reqwest::Client::new()
            .post(format!("{}/api/prompts/refresh", url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 202);
        let prompts = dashboard.prompts.list_loaded().await.unwrap();
        assert_eq!(prompts.data.map(|p| p.len()), Some(2));
    }

    #[tokio::test]
    async fn test_prompts_page_reload_drops_edits() {
        let (url, dashboard) = dashboard_url().await;
        dashboard.prompts.save("gpt-4", "Be brief.").await.unwrap();

        let resp = reqwest::get(format!("{}/prompts", url)).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        dashboard.prompts.list_loaded().await.unwrap();

        let (_, prompt) = get_json(&format!("{}/api/prompts/gpt-4", url)).await;
        assert_ne!(prompt["text"], json!("Be brief."));
    }

    #[test]
    fn test_list_pages_keep_polling_while_loading() {
        assert!(super::AGENTS_TEMPLATE.contains("if (agentsState.list.loading) setTimeout(pollAgents"));
        assert!(super::PROMPTS_TEMPLATE.contains("if (promptsState.loading) setTimeout(pollPrompts"));
    }

    #[tokio::test]
    async fn test_pages_render() {
        let (url, _dashboard) = dashboard_url().await;

        for page in ["/", "/agents", "/prompts", "/logs"] {
            let resp = reqwest::get(format!("{}{}", url, page)).await.unwrap();
            assert_eq!(resp.status().as_u16(), 200, "{}", page);
            let body = resp.text().await.unwrap();
            assert!(body.contains("<html"), "{}", page);
            assert!(!body.contains("{{"), "unfilled placeholder on {}", page);
        }
    }
}
