use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use opsboard_core::{AgentRun, Mission};
use opsboard_db::{MissionFilter, NewAgentRun};

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db, open_db_rw};

const RUNS_FETCH_LIMIT: u32 = 100;
const DEFAULT_SPAWN_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_THINKING_LEVEL: &str = "medium";

/// Mission context attached to a run listing, keyed by mission id.
#[derive(Debug, Clone, Serialize)]
pub struct MissionSummary {
    pub id: i64,
    pub title: String,
    pub project: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentRunsView {
    pub runs: Vec<AgentRun>,
    pub missions: BTreeMap<i64, MissionSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpawnRequest {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub mission_id: Option<i64>,
}

#[derive(Clone)]
pub struct RunsService {
    config: SharedConfig,
}

impl RunsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Recent runs with optional in-memory status/model filters, plus
    /// summaries for the missions those runs belong to.
    pub fn list(
        &self,
        mission_id: Option<i64>,
        status: Option<&str>,
        model: Option<&str>,
        limit: Option<u32>,
    ) -> Result<AgentRunsView> {
        let limit = limit.unwrap_or(RUNS_FETCH_LIMIT);
        let db = open_db(&self.config)?;
        let mut runs = match mission_id {
            Some(mission_id) => db.agent_runs_for_mission(mission_id)?,
            None => db.list_agent_runs(limit)?,
        };
        if let Some(status) = status {
            runs.retain(|run| run.status == status);
        }
        if let Some(model) = model {
            runs.retain(|run| run.model == model);
        }
        runs.truncate(limit as usize);

        let linked: BTreeSet<i64> = runs.iter().filter_map(|run| run.mission_id).collect();
        let mut missions = BTreeMap::new();
        if !linked.is_empty() {
            for mission in db.list_missions(&MissionFilter::default())? {
                if linked.contains(&mission.id) {
                    missions.insert(mission.id, summarize(&mission));
                }
            }
        }
        Ok(AgentRunsView { runs, missions })
    }

    /// Records a spawn request as a `pending` run. Execution is out of
    /// scope here; an external worker picks the row up.
    pub fn spawn(&self, request: &SpawnRequest) -> Result<AgentRun> {
        let task = request
            .task
            .as_deref()
            .map(str::trim)
            .filter(|task| !task.is_empty())
            .ok_or_else(|| AppError::InvalidInput("task is required".to_string()))?;

        let new_run = NewAgentRun {
            label: format!("spawn-{}", Utc::now().timestamp_millis()),
            task: task.to_string(),
            model: request
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_SPAWN_MODEL.to_string()),
            thinking_level: request
                .thinking
                .clone()
                .unwrap_or_else(|| DEFAULT_THINKING_LEVEL.to_string()),
            mission_id: request.mission_id,
        };
        let db = open_db_rw(&self.config)?;
        Ok(db.insert_pending_run(&new_run)?)
    }
}

fn summarize(mission: &Mission) -> MissionSummary {
    MissionSummary {
        id: mission.id,
        title: mission.title.clone(),
        project: mission.project.clone(),
    }
}
