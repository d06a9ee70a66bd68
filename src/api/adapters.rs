//! Shape adapters from backend payloads to view models.
//!
//! Everything here is pure apart from the injected random source. Agents,
//! prompts and agent detail graphs are synthesized from the log collection
//! with placeholder numbers: they are mock data standing in for backend
//! aggregates that do not exist yet, not telemetry.

use super::models::{
    Agent, AgentActivityPoint, AgentDetails, AgentStatus, LogRecord, LogStatus,
    PerformancePoint, Prompt, RawLogEntry,
};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::collections::HashSet;

/// Model name used when a log row carries none.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Hours in an agent detail graph.
const DETAIL_HOURS: u32 = 24;

/// Oldest placeholder prompt age.
const MAX_PROMPT_AGE_MS: i64 = 7 * 86_400_000;

/// Fixed performance of the first four prompt versions shown in the editor.
const BASELINE_PERFORMANCE: [(u32, f64); 4] = [(1, 65.0), (2, 72.0), (3, 78.0), (4, 85.0)];

// ============================================================================
// Logs
// ============================================================================

/// Classify a raw row: errors win, then anything other than HTTP 200 is a
/// timeout.
pub fn classify_status(raw: &RawLogEntry) -> LogStatus {
    if raw.is_error {
        LogStatus::Error
    } else if raw.http_status != Some(200) {
        LogStatus::Timeout
    } else {
        LogStatus::Success
    }
}

/// Milliseconds to seconds, one decimal. Ties round away from zero, so
/// 250 ms reads "0.3".
pub fn format_duration(latency_ms: f64) -> String {
    format!("{:.1}", (latency_ms / 100.0).round() / 10.0)
}

/// Map one raw row. `index` is the row's zero-based position and becomes the
/// id when the backend omitted `request_id`.
pub fn adapt_log(index: usize, raw: &RawLogEntry) -> LogRecord {
    let model = model_name(raw).to_string();
    let id = non_empty(raw.request_id.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| (index + 1).to_string());

    let prompt = if raw.user_message_length > 0 {
        format!("Request {}", id)
    } else {
        "N/A".to_string()
    };

    LogRecord {
        id,
        status: classify_status(raw),
        agent: model.clone(),
        model,
        prompt,
        duration: format_duration(raw.latency_ms),
        tokens: raw.token_usage_total,
        cost: raw.cost_usd,
        timestamp: raw.timestamp.clone(),
    }
}

pub fn adapt_logs(raws: &[RawLogEntry]) -> Vec<LogRecord> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| adapt_log(i, raw))
        .collect()
}

fn model_name(raw: &RawLogEntry) -> &str {
    non_empty(raw.model.as_deref()).unwrap_or(UNKNOWN_MODEL)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Distinct model names in first-seen order.
pub fn distinct_models(raws: &[RawLogEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    raws.iter()
        .map(model_name)
        .filter(|m| seen.insert(*m))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Agents
// ============================================================================

/// One active agent per model. The id is the model name so a selection
/// survives reordering between polls.
pub fn synthesize_agents<R: Rng>(models: &[String], rng: &mut R) -> Vec<Agent> {
    models
        .iter()
        .map(|model| Agent {
            id: model.clone(),
            name: model.clone(),
            status: AgentStatus::Active,
            usage: rng.gen_range(0.0..100.0),
            error_rate: rng.gen_range(0.0..5.0),
            last_active: "now".to_string(),
        })
        .collect()
}

pub fn synthesize_agent_details<R: Rng>(rng: &mut R) -> AgentDetails {
    AgentDetails {
        usage_graph: hourly_activity(rng),
        error_graph: hourly_activity(rng),
        token_graph: hourly_activity(rng),
    }
}

fn hourly_activity<R: Rng>(rng: &mut R) -> Vec<AgentActivityPoint> {
    (0..DETAIL_HOURS)
        .map(|hour| AgentActivityPoint {
            time: format!("{:02}:00", hour),
            usage: rng.gen_range(20..120),
            errors: rng.gen_range(0..10),
            tokens: rng.gen_range(100..600),
        })
        .collect()
}

// ============================================================================
// Prompts
// ============================================================================

pub fn synthesize_prompts<R: Rng>(
    models: &[String],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Prompt> {
    models
        .iter()
        .map(|model| Prompt {
            id: model.clone(),
            name: format!("{} Prompt", model),
            agent: model.clone(),
            version: rng.gen_range(1..=5),
            text: format!("System prompt for {} model configuration.", model),
            created_at: now - ChronoDuration::milliseconds(rng.gen_range(0..MAX_PROMPT_AGE_MS)),
            performance: rng.gen_range(0.0..100.0),
        })
        .collect()
}

/// A locally saved edit: next version, new text, placeholder performance
/// bump capped at 100.
pub fn revise_prompt<R: Rng>(prompt: &Prompt, text: &str, rng: &mut R) -> Prompt {
    Prompt {
        version: prompt.version + 1,
        text: text.to_string(),
        performance: (prompt.performance + rng.gen_range(0.0..10.0)).min(100.0),
        ..prompt.clone()
    }
}

pub fn performance_history(prompt: &Prompt) -> Vec<PerformancePoint> {
    BASELINE_PERFORMANCE
        .iter()
        .map(|&(version, performance)| PerformancePoint { version, performance })
        .chain(std::iter::once(PerformancePoint {
            version: prompt.version,
            performance: prompt.performance,
        }))
        .collect()
}
