use chrono::{SecondsFormat, Utc};
use rusqlite::Row;

use opsboard_core::{AgentRun, Mission, MissionStep, OpsEvent, Repo};

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) const MISSION_COLUMNS: &str = "m.id, m.title, m.description, m.mission_type, m.status, m.project, m.priority, \
     m.expected_outcome, m.definition_of_done, m.outcome, m.lessons, m.repo_id, r.name, \
     m.requested_by, m.started_at, m.completed_at, m.created_at, m.updated_at";

pub(crate) fn row_to_mission(row: &Row<'_>) -> std::result::Result<Mission, rusqlite::Error> {
    Ok(Mission {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        mission_type: row.get(3)?,
        status: row.get(4)?,
        project: row.get(5)?,
        priority: row.get(6)?,
        expected_outcome: row.get(7)?,
        definition_of_done: row.get(8)?,
        outcome: row.get(9)?,
        lessons: row.get(10)?,
        repo_id: row.get(11)?,
        repo_name: row.get(12)?,
        requested_by: row.get(13)?,
        started_at: row.get(14)?,
        completed_at: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

pub(crate) fn row_to_mission_step(row: &Row<'_>) -> std::result::Result<MissionStep, rusqlite::Error> {
    Ok(MissionStep {
        id: row.get(0)?,
        mission_id: row.get(1)?,
        step_number: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        outcome: row.get(6)?,
        agent_id: row.get(7)?,
        session_key: row.get(8)?,
        brief: row.get(9)?,
        plan: row.get(10)?,
        output: row.get(11)?,
        cost_usd: row.get(12)?,
        started_at: row.get(13)?,
        completed_at: row.get(14)?,
    })
}

pub(crate) const RUN_COLUMNS: &str = "id, label, task, mission_id, step_id, model, thinking_level, status, tokens_input, \
     tokens_output, tokens_cache, cost_usd, duration_sec, started_at, completed_at, \
     result_summary, error, session_key, created_at";

pub(crate) fn row_to_agent_run(row: &Row<'_>) -> std::result::Result<AgentRun, rusqlite::Error> {
    Ok(AgentRun {
        id: row.get(0)?,
        label: row.get(1)?,
        task: row.get(2)?,
        mission_id: row.get(3)?,
        step_id: row.get(4)?,
        model: row.get(5)?,
        thinking_level: row.get(6)?,
        status: row.get(7)?,
        tokens_input: row.get(8)?,
        tokens_output: row.get(9)?,
        tokens_cache: row.get(10)?,
        cost_usd: row.get(11)?,
        duration_sec: row.get(12)?,
        started_at: row.get(13)?,
        completed_at: row.get(14)?,
        result_summary: row.get(15)?,
        error: row.get(16)?,
        session_key: row.get(17)?,
        created_at: row.get(18)?,
    })
}

pub(crate) fn row_to_ops_event(row: &Row<'_>) -> std::result::Result<OpsEvent, rusqlite::Error> {
    Ok(OpsEvent {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        category: row.get(2)?,
        event: row.get(3)?,
        mission_id: row.get(4)?,
        agent_run_id: row.get(5)?,
        pr_id: row.get(6)?,
        repo_id: row.get(7)?,
    })
}

pub(crate) fn row_to_repo(row: &Row<'_>) -> std::result::Result<Repo, rusqlite::Error> {
    Ok(Repo {
        id: row.get(0)?,
        name: row.get(1)?,
        default_branch: row.get(2)?,
        created_at: row.get(3)?,
    })
}
