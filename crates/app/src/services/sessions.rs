//! Live session view over the agent gateway's `/api/sessions`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use opsboard_core::{PricingTable, estimate_cost, round_cents};

use crate::error::Result;
use crate::services::SharedConfig;

const ACTIVE_WINDOW_MS: i64 = 300_000;
const RECENT_WINDOW_MS: i64 = 86_400_000;
const RECENT_CAP: usize = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
    key: String,
    #[serde(default)]
    kind: String,
    updated_at: i64,
    age_ms: i64,
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawResponse {
    #[serde(default)]
    sessions: Vec<RawSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub key: String,
    pub label: String,
    pub model: String,
    pub status: String,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<SessionTokens>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: u64,
    pub total_tokens: u64,
    pub model_breakdown: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionsView {
    pub active: Vec<SessionView>,
    pub recent: Vec<SessionView>,
    pub stats: SessionStats,
}

/// Readable label from the session key, e.g.
/// `agent:main:subagent:uuid` -> `subagent`.
fn extract_label(key: &str) -> String {
    let parts: Vec<&str> = key.split(':').collect();
    if parts.len() >= 3 {
        parts[2].to_string()
    } else {
        key.to_string()
    }
}

// Cron runs show up twice upstream: once as the parent session and once
// per `run` sub-entry. Keep the parent only.
fn is_run_sub_entry(key: &str) -> bool {
    key.split(':').skip(1).any(|part| part == "run")
}

fn is_active(session: &RawSession) -> bool {
    session.age_ms < ACTIVE_WINDOW_MS
}

fn ms_to_rfc3339(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn tokens_of(session: &RawSession) -> Option<SessionTokens> {
    let total = session.total_tokens?;
    if total == 0 {
        return None;
    }
    Some(SessionTokens {
        input: session.input_tokens.unwrap_or(0),
        output: session.output_tokens.unwrap_or(0),
        total,
    })
}

fn build_view(pricing: &PricingTable, now_ms: i64, raw: Vec<RawSession>) -> SessionsView {
    let filtered: Vec<RawSession> = raw
        .into_iter()
        .filter(|session| !is_run_sub_entry(&session.key))
        .collect();

    let active: Vec<SessionView> = filtered
        .iter()
        .filter(|session| is_active(session) && session.kind == "direct")
        .map(|session| SessionView {
            key: session.key.clone(),
            label: extract_label(&session.key),
            model: session.model.clone().unwrap_or_else(|| "unknown".to_string()),
            status: "active".to_string(),
            started_at: ms_to_rfc3339(session.updated_at - session.age_ms),
            completed_at: None,
            tokens: tokens_of(session),
            cost: None,
            duration: None,
        })
        .collect();

    let day_ago = now_ms - RECENT_WINDOW_MS;
    let recent: Vec<SessionView> = filtered
        .iter()
        .filter(|session| {
            !is_active(session) && session.key.contains("subagent") && session.updated_at > day_ago
        })
        .take(RECENT_CAP)
        .map(|session| {
            let model = session.model.clone().unwrap_or_else(|| "unknown".to_string());
            let cost = tokens_of(session).map(|tokens| {
                round_cents(estimate_cost(
                    pricing,
                    &model,
                    tokens.input,
                    tokens.output,
                    tokens.total,
                ))
            });
            SessionView {
                key: session.key.clone(),
                label: extract_label(&session.key),
                model,
                status: "completed".to_string(),
                started_at: ms_to_rfc3339(session.updated_at - session.age_ms),
                completed_at: Some(ms_to_rfc3339(session.updated_at)),
                tokens: tokens_of(session),
                cost,
                duration: Some(session.age_ms / 1000),
            }
        })
        .collect();

    let mut model_breakdown: BTreeMap<String, u64> = BTreeMap::new();
    for session in &filtered {
        let model = session.model.clone().unwrap_or_else(|| "unknown".to_string());
        *model_breakdown.entry(model).or_insert(0) += 1;
    }
    let stats = SessionStats {
        total_sessions: filtered.len() as u64,
        total_tokens: filtered
            .iter()
            .map(|session| session.total_tokens.unwrap_or(0))
            .sum(),
        model_breakdown,
    };

    SessionsView {
        active,
        recent,
        stats,
    }
}

#[derive(Clone)]
pub struct SessionsService {
    config: SharedConfig,
}

impl SessionsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    async fn fetch_raw(&self) -> Vec<RawSession> {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "http client unavailable");
                return Vec::new();
            }
        };
        let url = format!(
            "{}/api/sessions",
            self.config.sessions_api_url.trim_end_matches('/')
        );
        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "sessions api unreachable, serving an empty view");
                return Vec::new();
            }
        };
        match response.error_for_status() {
            Ok(response) => match response.json::<RawResponse>().await {
                Ok(payload) => payload.sessions,
                Err(err) => {
                    warn!(error = %err, "sessions api payload unreadable");
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(error = %err, "sessions api returned an error status");
                Vec::new()
            }
        }
    }

    pub async fn overview(&self) -> Result<SessionsView> {
        let raw = self.fetch_raw().await;
        let now_ms = Utc::now().timestamp_millis();
        Ok(build_view(&self.config.pricing, now_ms, raw))
    }
}
