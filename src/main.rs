//! agentmon binary: mounts the dashboard views and serves them.

use agentmon::api::ApiClient;
use agentmon::config::DashboardConfig;
use agentmon::views::Dashboard;
use agentmon::web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("agentmon=info".parse()?))
        .init();

    // Load configuration
    let cfg = DashboardConfig::load();
    tracing::info!("Starting agentmon on port {}...", cfg.http_port);
    tracing::info!("Using backend at {}", cfg.api_base_url);

    let client = ApiClient::new(&cfg.api_base_url)?;

    // The dashboard still starts when the backend is down; views show
    // their empty state until it comes up.
    match client.check_health().await {
        Ok(health) => tracing::info!("Backend health: {}", health.status),
        Err(e) => tracing::warn!("Backend not reachable yet: {}", e),
    }

    // Mount views
    let dashboard = Arc::new(Dashboard::mount(client, &cfg));

    // Start web server
    let server = Server::new(cfg, dashboard.clone());
    server.start(shutdown_signal()).await?;

    dashboard.unmount().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
