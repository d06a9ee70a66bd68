//! View state containers.
//!
//! Each view owns its pollers and local state; nothing is global. Mounting a
//! view starts its first fetch, unmounting stops it.

mod agents;
mod panels;
mod prompts;

pub use agents::*;
pub use panels::*;
pub use prompts::*;

use crate::api::ApiClient;
use crate::config::DashboardConfig;

/// Every view the dashboard serves.
pub struct Dashboard {
    pub metrics: MetricsPanel,
    pub charts: ChartsPanel,
    pub logs: LogsView,
    pub agents: AgentsView,
    pub prompts: PromptsView,
}

impl Dashboard {
    pub fn mount(client: ApiClient, cfg: &DashboardConfig) -> Self {
        Self {
            metrics: MetricsPanel::mount(client.clone(), cfg.metrics_interval, cfg.overlap_policy),
            charts: ChartsPanel::mount(client.clone(), cfg.charts_interval, cfg.overlap_policy),
            logs: LogsView::mount(client.clone()),
            agents: AgentsView::mount(client.clone()),
            prompts: PromptsView::mount(client),
        }
    }

    pub async fn unmount(&self) {
        self.metrics.unmount();
        self.charts.unmount();
        self.logs.unmount().await;
        self.agents.unmount().await;
        self.prompts.unmount().await;
        tracing::info!("Dashboard views unmounted");
    }
}
