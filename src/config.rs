//! Configuration module for agentmon.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::poller::OverlapPolicy;

use std::env;
use std::time::Duration;

/// Dashboard configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the logs backend (default: "http://localhost:8000")
    pub api_base_url: String,
    /// HTTP port for the dashboard server (default: 3000)
    pub http_port: u16,
    /// Refresh interval for the metrics panel (default: 5s)
    pub metrics_interval: Duration,
    /// Refresh interval for the charts panel (default: 10s)
    pub charts_interval: Duration,
    /// What to do when a poll cycle is still running at the next tick
    pub overlap_policy: OverlapPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            http_port: 3000,
            metrics_interval: Duration::from_secs(5),
            charts_interval: Duration::from_secs(10),
            overlap_policy: OverlapPolicy::Serialize,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AGENTMON_API_BASE_URL`: backend base URL (default: "http://localhost:8000")
    /// - `AGENTMON_HTTP_PORT`: HTTP port (default: 3000)
    /// - `AGENTMON_METRICS_INTERVAL_SECS`: metrics refresh (default: 5)
    /// - `AGENTMON_CHARTS_INTERVAL_SECS`: charts refresh (default: 10)
    /// - `AGENTMON_OVERLAP_POLICY`: "serialize" or "independent" (default: serialize)
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("AGENTMON_API_BASE_URL") {
            let url = url.trim();
            if !url.is_empty() {
                cfg.api_base_url = url.to_string();
            }
        }

        if let Some(port_str) = lookup("AGENTMON_HTTP_PORT") {
            match port_str.parse() {
                Ok(port) => cfg.http_port = port,
                Err(_) => tracing::warn!("Ignoring invalid AGENTMON_HTTP_PORT: {}", port_str),
            }
        }

        if let Some(secs) = lookup("AGENTMON_METRICS_INTERVAL_SECS") {
            if let Some(interval) = parse_interval("AGENTMON_METRICS_INTERVAL_SECS", &secs) {
                cfg.metrics_interval = interval;
            }
        }

        if let Some(secs) = lookup("AGENTMON_CHARTS_INTERVAL_SECS") {
            if let Some(interval) = parse_interval("AGENTMON_CHARTS_INTERVAL_SECS", &secs) {
                cfg.charts_interval = interval;
            }
        }

        if let Some(policy) = lookup("AGENTMON_OVERLAP_POLICY") {
            match policy.parse() {
                Ok(p) => cfg.overlap_policy = p,
                Err(e) => tracing::warn!("Ignoring AGENTMON_OVERLAP_POLICY: {}", e),
            }
        }

        cfg
    }
}

/// Zero and unparseable values keep the default.
fn parse_interval(key: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs > 0.0 && secs.is_finite() => Some(Duration::from_secs_f64(secs)),
        _ => {
            tracing::warn!("Ignoring invalid {}: {}", key, value);
            None
        }
    }
}
