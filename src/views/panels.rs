//! Dashboard panels: the refreshing metrics and charts, and the on-demand
//! logs list.

use crate::api::{ApiClient, ChartData, LogRecord, MetricsSnapshot};
use crate::poller::{Cadence, OverlapPolicy, PollState, Poller, PollerHandle};

use std::time::Duration;
use tokio::sync::RwLock;

/// KPI cards, refreshed on an interval.
pub struct MetricsPanel {
    handle: PollerHandle<MetricsSnapshot>,
}

impl MetricsPanel {
    pub fn mount(client: ApiClient, interval: Duration, overlap: OverlapPolicy) -> Self {
        let handle = Poller::new("metrics", Cadence::Every(interval))
            .overlap(overlap)
            .spawn(move || {
                let client = client.clone();
                async move { client.try_fetch_metrics().await }
            });
        Self { handle }
    }

    pub fn state(&self) -> PollState<MetricsSnapshot> {
        self.handle.snapshot()
    }

    pub fn poller(&self) -> &PollerHandle<MetricsSnapshot> {
        &self.handle
    }

    pub fn unmount(&self) {
        self.handle.stop();
    }
}

/// The five trend charts, refreshed on an interval.
pub struct ChartsPanel {
    handle: PollerHandle<ChartData>,
}

impl ChartsPanel {
    pub fn mount(client: ApiClient, interval: Duration, overlap: OverlapPolicy) -> Self {
        let handle = Poller::new("charts", Cadence::Every(interval))
            .overlap(overlap)
            .spawn(move || {
                let client = client.clone();
                async move { client.try_fetch_chart_data().await }
            });
        Self { handle }
    }

    pub fn state(&self) -> PollState<ChartData> {
        self.handle.snapshot()
    }

    pub fn poller(&self) -> &PollerHandle<ChartData> {
        &self.handle
    }

    pub fn unmount(&self) {
        self.handle.stop();
    }
}

/// Request log list. Fetched once per mount; `refresh` remounts.
pub struct LogsView {
    client: ApiClient,
    handle: RwLock<PollerHandle<Vec<LogRecord>>>,
}

impl LogsView {
    pub fn mount(client: ApiClient) -> Self {
        let handle = RwLock::new(Self::load(client.clone()));
        Self { client, handle }
    }

    fn load(client: ApiClient) -> PollerHandle<Vec<LogRecord>> {
        Poller::new("logs", Cadence::Once).spawn(move || {
            let client = client.clone();
            async move { client.try_fetch_logs().await }
        })
    }

    pub async fn state(&self) -> PollState<Vec<LogRecord>> {
        self.handle.read().await.snapshot()
    }

    /// Drop the current fetch, in flight or not, and start a new one.
    pub async fn refresh(&self) {
        let next = Self::load(self.client.clone());
        *self.handle.write().await = next;
    }

    /// Wait for the current fetch.
    pub async fn loaded(&self) -> Option<PollState<Vec<LogRecord>>> {
        let mut rx = self.handle.read().await.subscribe();
        let state = rx.wait_for(|s| !s.loading).await.ok()?;
        Some(state.clone())
    }

    pub async fn unmount(&self) {
        self.handle.read().await.stop();
    }
}
