use rusqlite::params;

use opsboard_core::{AgentRun, RunStatus};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{RUN_COLUMNS, now_rfc3339, row_to_agent_run};

/// Fields for the spawn stub's `pending` row. Execution itself happens in
/// an external process; this record only marks the request.
#[derive(Debug, Clone)]
pub struct NewAgentRun {
    pub label: String,
    pub task: String,
    pub model: String,
    pub thinking_level: String,
    pub mission_id: Option<i64>,
}

impl Db {
    pub fn list_agent_runs(&self, limit: u32) -> Result<Vec<AgentRun>> {
        let sql = format!(
            "SELECT {RUN_COLUMNS}
             FROM agent_runs
             ORDER BY datetime(started_at) DESC
             LIMIT ?1"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit], row_to_agent_run)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn agent_runs_for_mission(&self, mission_id: i64) -> Result<Vec<AgentRun>> {
        let sql = format!(
            "SELECT {RUN_COLUMNS}
             FROM agent_runs
             WHERE mission_id = ?1
             ORDER BY datetime(started_at) DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(params![mission_id], row_to_agent_run)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_agent_run(&self, id: i64) -> Result<Option<AgentRun>> {
        let sql = format!("SELECT {RUN_COLUMNS} FROM agent_runs WHERE id = ?1");
        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], row_to_agent_run)?;
        match rows.next() {
            Some(run) => Ok(Some(run?)),
            None => Ok(None),
        }
    }

    pub fn insert_pending_run(&self, new_run: &NewAgentRun) -> Result<AgentRun> {
        let now = now_rfc3339();
        self.conn().execute(
            r#"
            INSERT INTO agent_runs (
              label, task, mission_id, model, thinking_level, status, started_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                new_run.label,
                new_run.task,
                new_run.mission_id,
                new_run.model,
                new_run.thinking_level,
                RunStatus::Pending.as_str(),
                now,
                now,
            ],
        )?;
        let id = self.conn().last_insert_rowid();
        self.get_agent_run(id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}
