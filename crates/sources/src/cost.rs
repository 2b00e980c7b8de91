//! Cost-record sources. Three interchangeable strategies produce the same
//! `CostRecord` stream: a remote sessions API, per-day usage note files,
//! and per-session JSONL logs. A record that cannot be parsed is skipped;
//! a batch never fails because of one bad entry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use opsboard_core::{
    CostRecord, PricingTable, estimate_cost, infer_project, local_day, normalize_model,
};

use crate::error::{Result, SourceError};

#[async_trait]
pub trait CostSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CostRecord>>;
}

fn build_record(
    pricing: &PricingTable,
    date: NaiveDate,
    session_key: &str,
    label: Option<&str>,
    model: Option<&str>,
    input_tokens: u64,
    output_tokens: u64,
    total_tokens: u64,
) -> CostRecord {
    // The session key carries a model hint when the API omits the field.
    let raw_model = model.unwrap_or(session_key);
    CostRecord {
        date,
        model: normalize_model(raw_model).to_string(),
        project: infer_project(session_key, label).to_string(),
        amount_usd: estimate_cost(pricing, raw_model, input_tokens, output_tokens, total_tokens),
        session_id: session_key.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
    key: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
    /// Milliseconds since the epoch.
    #[serde(default)]
    updated_at: Option<i64>,
}

fn sessions_array(payload: &Value) -> Result<&Vec<Value>> {
    if let Some(list) = payload.get("sessions").and_then(Value::as_array) {
        return Ok(list);
    }
    if let Some(list) = payload.as_array() {
        return Ok(list);
    }
    Err(SourceError::Payload(
        "expected a session array or {\"sessions\": [...]}".into(),
    ))
}

fn record_from_session(pricing: &PricingTable, tz: Tz, raw: &Value) -> Option<CostRecord> {
    let session: RawSession = match serde_json::from_value(raw.clone()) {
        Ok(session) => session,
        Err(err) => {
            debug!(error = %err, "skipping malformed session entry");
            return None;
        }
    };
    let total = session.total_tokens?;
    if total == 0 {
        return None;
    }
    let timestamp = session
        .updated_at
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now);
    Some(build_record(
        pricing,
        local_day(timestamp, &tz),
        &session.key,
        session.label.as_deref(),
        session.model.as_deref(),
        session.input_tokens.unwrap_or(0),
        session.output_tokens.unwrap_or(0),
        total,
    ))
}

/// Fetches live session usage from the agent gateway's `/api/sessions`.
pub struct SessionsApiSource {
    base_url: String,
    client: reqwest::Client,
    pricing: PricingTable,
    tz: Tz,
}

impl SessionsApiSource {
    pub fn new(base_url: impl Into<String>, pricing: PricingTable, tz: Tz) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
            pricing,
            tz,
        })
    }
}

#[async_trait]
impl CostSource for SessionsApiSource {
    async fn fetch(&self) -> Result<Vec<CostRecord>> {
        let url = format!("{}/api/sessions", self.base_url.trim_end_matches('/'));
        let payload: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let records = sessions_array(&payload)?
            .iter()
            .filter_map(|raw| record_from_session(&self.pricing, self.tz, raw))
            .collect();
        Ok(records)
    }
}

// `- [agent:main:subagent:boost:abc] model=claude-sonnet-4-5 tokens=1200000 in=1000000 out=200000`
static NOTE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^- \[([^\]]+)\] model=(\S+) tokens=(\d+)(?: in=(\d+))?(?: out=(\d+))?")
        .expect("note line regex")
});

/// Reads usage lines from `<workspace>/memory/notes/YYYY-MM-DD.md`. The
/// filename is the record date, so no timezone conversion applies here.
pub struct NoteFileSource {
    notes_dir: PathBuf,
    pricing: PricingTable,
}

impl NoteFileSource {
    pub fn new(workspace: &Path, pricing: PricingTable) -> Self {
        Self {
            notes_dir: workspace.join("memory").join("notes"),
            pricing,
        }
    }

    fn parse_note(&self, date: NaiveDate, contents: &str) -> Vec<CostRecord> {
        contents
            .lines()
            .filter_map(|line| {
                let caps = NOTE_LINE.captures(line)?;
                let key = caps.get(1)?.as_str();
                let model = caps.get(2)?.as_str();
                let total: u64 = caps.get(3)?.as_str().parse().ok()?;
                let input = caps.get(4).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
                let output = caps.get(5).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
                Some(build_record(
                    &self.pricing,
                    date,
                    key,
                    None,
                    Some(model),
                    input,
                    output,
                    total,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl CostSource for NoteFileSource {
    async fn fetch(&self) -> Result<Vec<CostRecord>> {
        let entries = match std::fs::read_dir(&self.notes_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") else {
                debug!(file = %path.display(), "skipping note file without a date name");
                continue;
            };
            let contents = std::fs::read_to_string(&path)?;
            records.extend(self.parse_note(date, &contents));
        }
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogLine {
    #[serde(alias = "key")]
    session_key: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
    timestamp: DateTime<Utc>,
}

/// Reads per-session usage from `<workspace>/sessions/*.jsonl`, one JSON
/// object per line. Malformed lines are skipped individually.
pub struct SessionLogSource {
    sessions_dir: PathBuf,
    pricing: PricingTable,
    tz: Tz,
}

impl SessionLogSource {
    pub fn new(workspace: &Path, pricing: PricingTable, tz: Tz) -> Self {
        Self {
            sessions_dir: workspace.join("sessions"),
            pricing,
            tz,
        }
    }

    fn parse_log(&self, contents: &str) -> Vec<CostRecord> {
        contents
            .lines()
            .filter_map(|line| {
                let raw: RawLogLine = match serde_json::from_str(line) {
                    Ok(raw) => raw,
                    Err(err) => {
                        debug!(error = %err, "skipping malformed session log line");
                        return None;
                    }
                };
                let input = raw.input_tokens.unwrap_or(0);
                let output = raw.output_tokens.unwrap_or(0);
                let total = raw.total_tokens.unwrap_or(input + output);
                if input == 0 && output == 0 && total == 0 {
                    return None;
                }
                Some(build_record(
                    &self.pricing,
                    local_day(raw.timestamp, &self.tz),
                    &raw.session_key,
                    raw.label.as_deref(),
                    raw.model.as_deref(),
                    input,
                    output,
                    total,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl CostSource for SessionLogSource {
    async fn fetch(&self) -> Result<Vec<CostRecord>> {
        let entries = match std::fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            records.extend(self.parse_log(&contents));
        }
        Ok(records)
    }
}
