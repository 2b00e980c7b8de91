use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};
use serde::Deserialize;

use opsboard_core::{Mission, MissionStep};

use crate::Db;
use crate::error::Result;
use crate::helpers::{MISSION_COLUMNS, now_rfc3339, row_to_mission, row_to_mission_step};

#[derive(Debug, Clone, Default)]
pub struct MissionFilter {
    pub project: Option<String>,
    pub status: Option<String>,
    pub mission_type: Option<String>,
    pub search: Option<String>,
}

/// Allow-listed partial update. Fields absent from the request body stay
/// untouched; anything not named here never reaches the database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionChanges {
    pub status: Option<String>,
    pub repo_id: Option<i64>,
    pub description: Option<String>,
    pub expected_outcome: Option<String>,
    pub definition_of_done: Option<String>,
}

impl MissionChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.repo_id.is_none()
            && self.description.is_none()
            && self.expected_outcome.is_none()
            && self.definition_of_done.is_none()
    }
}

impl Db {
    pub fn list_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(project) = &filter.project {
            conditions.push("m.project = ?");
            values.push(Value::Text(project.clone()));
        }
        if let Some(status) = &filter.status {
            conditions.push("m.status = ?");
            values.push(Value::Text(status.clone()));
        }
        if let Some(mission_type) = &filter.mission_type {
            conditions.push("m.mission_type = ?");
            values.push(Value::Text(mission_type.clone()));
        }
        if let Some(search) = &filter.search {
            conditions.push("(m.title LIKE ? OR m.description LIKE ?)");
            let needle = format!("%{}%", search);
            values.push(Value::Text(needle.clone()));
            values.push(Value::Text(needle));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {MISSION_COLUMNS}
             FROM missions m
             LEFT JOIN repos r ON m.repo_id = r.id
             {where_clause}
             ORDER BY m.created_at DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), row_to_mission)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_mission(&self, id: i64) -> Result<Option<Mission>> {
        let sql = format!(
            "SELECT {MISSION_COLUMNS}
             FROM missions m
             LEFT JOIN repos r ON m.repo_id = r.id
             WHERE m.id = ?1"
        );
        self.conn()
            .query_row(&sql, params![id], row_to_mission)
            .optional()
            .map_err(Into::into)
    }

    pub fn mission_steps(&self, mission_id: i64) -> Result<Vec<MissionStep>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, mission_id, step_number, title, description, status, outcome,
                   agent_id, session_key, brief, plan, output, cost_usd, started_at, completed_at
            FROM mission_steps
            WHERE mission_id = ?1
            ORDER BY step_number ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![mission_id], row_to_mission_step)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT DISTINCT project FROM missions ORDER BY project ASC")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Applies the recognized fields of `changes` and returns the updated
    /// mission, or `None` if the id does not exist. Callers reject an
    /// all-empty change set before getting here.
    pub fn update_mission(&self, id: i64, changes: &MissionChanges) -> Result<Option<Mission>> {
        if self.get_mission(id)?.is_none() {
            return Ok(None);
        }
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(status) = &changes.status {
            assignments.push("status = ?");
            values.push(Value::Text(status.clone()));
        }
        if let Some(repo_id) = changes.repo_id {
            assignments.push("repo_id = ?");
            values.push(Value::Integer(repo_id));
        }
        if let Some(description) = &changes.description {
            assignments.push("description = ?");
            values.push(Value::Text(description.clone()));
        }
        if let Some(expected_outcome) = &changes.expected_outcome {
            assignments.push("expected_outcome = ?");
            values.push(Value::Text(expected_outcome.clone()));
        }
        if let Some(definition_of_done) = &changes.definition_of_done {
            assignments.push("definition_of_done = ?");
            values.push(Value::Text(definition_of_done.clone()));
        }
        if !assignments.is_empty() {
            assignments.push("updated_at = ?");
            values.push(Value::Text(now_rfc3339()));
            values.push(Value::Integer(id));
            let sql = format!(
                "UPDATE missions SET {} WHERE id = ?",
                assignments.join(", ")
            );
            self.conn().execute(&sql, params_from_iter(values))?;
        }
        self.get_mission(id)
    }
}
