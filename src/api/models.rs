//! Backend payloads and the view models derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Metrics
// ============================================================================

/// Scalar KPIs for the dashboard header, pre-formatted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(deserialize_with = "string_or_number")]
    pub avg_latency: String,
    #[serde(deserialize_with = "string_or_number")]
    pub cost_today: String,
    #[serde(deserialize_with = "string_or_number")]
    pub token_usage: String,
    pub errors: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub retry_rate: String,
    #[serde(deserialize_with = "string_or_number")]
    pub active_users: String,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            avg_latency: "0 ms".to_string(),
            cost_today: "$0.00".to_string(),
            token_usage: "0 prompt / 0 completion".to_string(),
            errors: 0,
            retry_rate: "0".to_string(),
            active_users: "0".to_string(),
        }
    }
}

/// The backend sends some display fields as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Display {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Display::deserialize(deserializer)? {
        Display::Text(s) => s,
        Display::Number(n) => n.to_string(),
    })
}

// ============================================================================
// Charts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyPoint {
    pub time: String,
    pub latency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUsagePoint {
    pub time: String,
    pub prompt: u64,
    pub completion: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPoint {
    pub time: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPoint {
    pub time: String,
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityPoint {
    pub time: String,
    pub users: u64,
}

/// Five chronological series for the dashboard charts.
///
/// A series missing from the payload decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartData {
    pub latency_trend: Vec<LatencyPoint>,
    pub token_usage: Vec<TokenUsagePoint>,
    pub cost_progression: Vec<CostPoint>,
    pub error_rate: Vec<ErrorPoint>,
    pub user_activity: Vec<UserActivityPoint>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.latency_trend.is_empty()
            && self.token_usage.is_empty()
            && self.cost_progression.is_empty()
            && self.error_rate.is_empty()
            && self.user_activity.is_empty()
    }
}

// ============================================================================
// Logs
// ============================================================================

/// One row of the backend's `/logs/all` collection.
///
/// The backend writes these from chatbot traffic; any field may be missing
/// in older log files. A field of the wrong type reads as missing rather
/// than failing the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawLogEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub request_id: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_error: bool,
    #[serde(deserialize_with = "lenient_status")]
    pub http_status: Option<u16>,
    #[serde(deserialize_with = "lenient_text")]
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub user_message_length: u64,
    #[serde(deserialize_with = "lenient_float")]
    pub latency_ms: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub token_usage_total: u64,
    #[serde(deserialize_with = "lenient_float")]
    pub cost_usd: f64,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: String,
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// `true`, or any non-zero number.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Bool(b) => *b,
        Value::Number(_) => as_float(&value).is_some_and(|f| f != 0.0),
        _ => false,
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_float(&value)
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u16::MAX))
        .map(|f| f as u16))
}

/// Non-negative integer; fractions are truncated.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    Ok(as_float(&value).filter(|f| *f >= 0.0).map_or(0, |f| f as u64))
}

fn lenient_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_float(&Value::deserialize(deserializer)?).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
    Timeout,
}

/// A request event as shown in the logs list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    pub status: LogStatus,
    pub agent: String,
    pub model: String,
    pub prompt: String,
    /// Seconds with one decimal
    pub duration: String,
    pub tokens: u64,
    pub cost: f64,
    pub timestamp: String,
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
}

/// An agent, one per distinct model seen in the logs.
///
/// `usage` and `error_rate` are placeholder values until the backend grows
/// a per-model aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub status: AgentStatus,
    pub usage: f64,
    pub error_rate: f64,
    pub last_active: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentActivityPoint {
    pub time: String,
    pub usage: u32,
    pub errors: u32,
    pub tokens: u32,
}

/// Hourly activity graphs for the agent detail pane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetails {
    pub usage_graph: Vec<AgentActivityPoint>,
    pub error_graph: Vec<AgentActivityPoint>,
    pub token_graph: Vec<AgentActivityPoint>,
}

// ============================================================================
// Prompts
// ============================================================================

/// A system prompt, one per distinct model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub agent: String,
    pub version: u32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub performance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub version: u32,
    pub performance: f64,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
