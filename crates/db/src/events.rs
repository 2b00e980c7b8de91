use rusqlite::params;

use opsboard_core::{OpsEvent, TodaySummary};

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_ops_event;

pub const EVENTS_DEFAULT_LIMIT: u32 = 200;
pub const EVENTS_MAX_LIMIT: u32 = 500;

pub fn clamp_event_limit(requested: Option<u32>) -> u32 {
    match requested {
        Some(value) if value > 0 => value.min(EVENTS_MAX_LIMIT),
        _ => EVENTS_DEFAULT_LIMIT,
    }
}

impl Db {
    /// Most recent ops events, newest first. With a `since` watermark only
    /// entries at or after that timestamp are returned, which lets pollers
    /// fetch incrementally.
    pub fn list_ops_events(&self, limit: u32, since: Option<&str>) -> Result<Vec<OpsEvent>> {
        let mut events = Vec::new();
        if let Some(since) = since {
            let mut stmt = self.conn().prepare(
                r#"
                SELECT id, timestamp, category, event, mission_id, agent_run_id, pr_id, repo_id
                FROM ops_events
                WHERE timestamp >= ?1
                ORDER BY datetime(timestamp) DESC
                LIMIT ?2
                "#,
            )?;
            let rows = stmt.query_map(params![since, limit], row_to_ops_event)?;
            for row in rows {
                events.push(row?);
            }
        } else {
            let mut stmt = self.conn().prepare(
                r#"
                SELECT id, timestamp, category, event, mission_id, agent_run_id, pr_id, repo_id
                FROM ops_events
                ORDER BY datetime(timestamp) DESC
                LIMIT ?1
                "#,
            )?;
            let rows = stmt.query_map(params![limit], row_to_ops_event)?;
            for row in rows {
                events.push(row?);
            }
        }
        Ok(events)
    }

    /// Aggregate counts for one day, bounded by `[day_start, day_end)` in
    /// UTC; the caller derives the bounds from the reference timezone.
    pub fn today_summary(&self, day_start: &str, day_end: &str) -> Result<TodaySummary> {
        let summary = self.conn().query_row(
            r#"
            SELECT
              (SELECT COUNT(*) FROM ops_events
                WHERE timestamp >= ?1 AND timestamp < ?2) AS events_count,
              (SELECT COUNT(*) FROM agent_runs
                WHERE started_at >= ?1 AND started_at < ?2) AS runs_count,
              (SELECT COUNT(*) FROM agent_runs
                WHERE started_at >= ?1 AND started_at < ?2 AND status = 'completed') AS runs_completed,
              (SELECT COUNT(*) FROM agent_runs
                WHERE started_at >= ?1 AND started_at < ?2 AND status = 'failed') AS runs_failed,
              (SELECT ROUND(COALESCE(SUM(cost_usd), 0), 4) FROM agent_runs
                WHERE started_at >= ?1 AND started_at < ?2) AS cost_usd_total
            "#,
            params![day_start, day_end],
            |row| {
                Ok(TodaySummary {
                    events_count: row.get::<_, i64>(0)?.max(0) as u64,
                    runs_count: row.get::<_, i64>(1)?.max(0) as u64,
                    runs_completed: row.get::<_, i64>(2)?.max(0) as u64,
                    runs_failed: row.get::<_, i64>(3)?.max(0) as u64,
                    cost_usd_total: row.get(4)?,
                })
            },
        )?;
        Ok(summary)
    }
}
