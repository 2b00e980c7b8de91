use serde::Serialize;

use opsboard_core::{AgentRun, Mission, MissionStatus, MissionStep, Repo};
use opsboard_db::{MissionChanges, MissionFilter};

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, missing_mission, open_db, open_db_rw};

#[derive(Debug, Clone, Serialize)]
pub struct MissionDetail {
    pub mission: Mission,
    pub steps: Vec<MissionStep>,
    pub runs: Vec<AgentRun>,
}

#[derive(Clone)]
pub struct MissionsService {
    config: SharedConfig,
}

impl MissionsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn list(&self, filter: &MissionFilter) -> Result<Vec<Mission>> {
        let db = open_db(&self.config)?;
        Ok(db.list_missions(filter)?)
    }

    pub fn detail(&self, id: i64) -> Result<MissionDetail> {
        let db = open_db(&self.config)?;
        let mission = db.get_mission(id)?.ok_or_else(|| missing_mission(id))?;
        let steps = db.mission_steps(id)?;
        let runs = db.agent_runs_for_mission(id)?;
        Ok(MissionDetail {
            mission,
            steps,
            runs,
        })
    }

    /// Partial update. Unknown body fields were already dropped during
    /// deserialization; a body with zero recognized fields is invalid.
    pub fn update(&self, id: i64, changes: &MissionChanges) -> Result<Mission> {
        if changes.is_empty() {
            return Err(AppError::InvalidInput(
                "no valid fields to update".to_string(),
            ));
        }
        if let Some(status) = &changes.status {
            status
                .parse::<MissionStatus>()
                .map_err(AppError::InvalidInput)?;
        }
        let db = open_db_rw(&self.config)?;
        db.update_mission(id, changes)?
            .ok_or_else(|| missing_mission(id))
    }

    pub fn projects(&self) -> Result<Vec<String>> {
        let db = open_db(&self.config)?;
        Ok(db.list_projects()?)
    }

    pub fn repos(&self) -> Result<Vec<Repo>> {
        let db = open_db(&self.config)?;
        Ok(db.list_repos()?)
    }
}
