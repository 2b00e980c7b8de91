use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One cost-bearing record after classification and estimation. Transient:
/// built while aggregating, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub date: NaiveDate,
    pub model: String,
    pub project: String,
    pub amount_usd: f64,
    pub session_id: String,
}

/// Per-day cost rollup. Invariant: `total_usd` matches the sum of either
/// breakdown map to within a cent once rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCostBucket {
    pub date: NaiveDate,
    pub total_usd: f64,
    pub by_model: BTreeMap<String, f64>,
    pub by_project: BTreeMap<String, f64>,
    pub sessions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionStatus {
    Planned,
    InProgress,
    Done,
    Failed,
    Blocked,
    Deferred,
    Archived,
    Backlog,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Planned => "planned",
            MissionStatus::InProgress => "in-progress",
            MissionStatus::Done => "done",
            MissionStatus::Failed => "failed",
            MissionStatus::Blocked => "blocked",
            MissionStatus::Deferred => "deferred",
            MissionStatus::Archived => "archived",
            MissionStatus::Backlog => "backlog",
        }
    }
}

impl FromStr for MissionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "planned" => Ok(MissionStatus::Planned),
            "in-progress" => Ok(MissionStatus::InProgress),
            "done" => Ok(MissionStatus::Done),
            "failed" => Ok(MissionStatus::Failed),
            "blocked" => Ok(MissionStatus::Blocked),
            "deferred" => Ok(MissionStatus::Deferred),
            "archived" => Ok(MissionStatus::Archived),
            "backlog" => Ok(MissionStatus::Backlog),
            other => Err(format!("unknown mission status {other:?}")),
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agent-run lifecycle. Transitions happen in the external execution
/// process; this system only reads and writes the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Killed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Killed => "killed",
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(RunStatus::Pending),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            "killed" => Ok(RunStatus::Killed),
            other => Err(format!("unknown run status {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub mission_type: String,
    pub status: String,
    pub project: String,
    pub priority: String,
    pub expected_outcome: Option<String>,
    pub definition_of_done: Option<String>,
    pub outcome: Option<String>,
    pub lessons: Option<String>,
    pub repo_id: Option<i64>,
    pub repo_name: Option<String>,
    pub requested_by: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionStep {
    pub id: i64,
    pub mission_id: i64,
    pub step_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub outcome: Option<String>,
    pub agent_id: Option<String>,
    pub session_key: Option<String>,
    pub brief: Option<String>,
    pub plan: Option<String>,
    pub output: Option<String>,
    pub cost_usd: Option<f64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: i64,
    pub label: String,
    pub task: Option<String>,
    pub mission_id: Option<i64>,
    pub step_id: Option<i64>,
    pub model: String,
    pub thinking_level: Option<String>,
    pub status: String,
    pub tokens_input: Option<i64>,
    pub tokens_output: Option<i64>,
    pub tokens_cache: Option<i64>,
    pub cost_usd: Option<f64>,
    pub duration_sec: Option<i64>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub result_summary: Option<String>,
    pub error: Option<String>,
    pub session_key: Option<String>,
    pub created_at: String,
}

/// Append-only operational log record. This system only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsEvent {
    pub id: i64,
    pub timestamp: String,
    pub category: String,
    pub event: String,
    pub mission_id: Option<i64>,
    pub agent_run_id: Option<i64>,
    pub pr_id: Option<i64>,
    pub repo_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub default_branch: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub repo: String,
    pub number: i64,
    pub title: String,
    pub author: String,
    pub state: String,
    pub ci_status: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Parsed view of an ops-log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub raw: String,
}

/// An ops event admitted to the live feed buffer, with its timestamp
/// parsed for the dedup window check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub events_count: u64,
    pub runs_count: u64,
    pub runs_completed: u64,
    pub runs_failed: u64,
    pub cost_usd_total: f64,
}
