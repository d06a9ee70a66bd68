//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::DashboardConfig;
use crate::views::Dashboard;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: DashboardConfig,
    pub dashboard: Arc<Dashboard>,
}

/// Web server for the dashboard.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: DashboardConfig, dashboard: Arc<Dashboard>) -> Self {
        Self {
            state: AppState { config, dashboard },
        }
    }

    /// Build the router with all routes.
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Pages
            .route("/", get(handlers::handle_dashboard))
            .route("/agents", get(handlers::handle_agents_page))
            .route("/prompts", get(handlers::handle_prompts_page))
            .route("/logs", get(handlers::handle_logs_page))
            // API endpoints
            .route("/api/metrics", get(handlers::handle_get_metrics))
            .route("/api/charts", get(handlers::handle_get_charts))
            .route("/api/logs", get(handlers::handle_get_logs))
            .route("/api/logs/refresh", post(handlers::handle_refresh_logs))
            .route("/api/agents", get(handlers::handle_get_agents))
            .route("/api/agents/refresh", post(handlers::handle_refresh_agents))
            .route("/api/agents/{id}", get(handlers::handle_select_agent))
            .route("/api/prompts", get(handlers::handle_get_prompts))
            .route("/api/prompts/refresh", post(handlers::handle_refresh_prompts))
            .route(
                "/api/prompts/{id}",
                get(handlers::handle_get_prompt).put(handlers::handle_save_prompt),
            )
            .route("/api/prompts/{id}/history", get(handlers::handle_get_prompt_history))
            // Static assets
            .route("/favicon.ico", get(handlers::handle_favicon))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(64 * 1024)) // 64KB
            .with_state(self.state.clone())
    }

    /// Serve on the configured port until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
