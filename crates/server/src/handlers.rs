use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};

use opsboard_app::LogFeed;
use opsboard_app::services::{AgentRunsView, MissionDetail, SessionsView, SpawnRequest};
use opsboard_core::{DailyCostBucket, Mission, OpsEvent, PullRequest, Repo, TodaySummary};
use opsboard_db::{MissionChanges, MissionFilter};

use crate::errors::HttpError;
use crate::state::HttpState;

const DEFAULT_WINDOW_DAYS: u32 = 7;
const MAX_WINDOW_DAYS: u32 = 90;
const SSE_HEARTBEAT: Duration = Duration::from_secs(30);

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn sessions(State(state): State<HttpState>) -> Result<Json<SessionsView>, HttpError> {
    let view = state.services.sessions.overview().await?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct AgentRunsQuery {
    mission_id: Option<i64>,
    status: Option<String>,
    model: Option<String>,
    limit: Option<u32>,
}

pub async fn agent_runs(
    State(state): State<HttpState>,
    Query(query): Query<AgentRunsQuery>,
) -> Result<Json<AgentRunsView>, HttpError> {
    let view = state.services.runs.list(
        query.mission_id,
        query.status.as_deref(),
        query.model.as_deref(),
        query.limit,
    )?;
    Ok(Json(view))
}

pub async fn spawn(
    State(state): State<HttpState>,
    Json(request): Json<SpawnRequest>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let run = state.services.runs.spawn(&request)?;
    Ok(Json(serde_json::json!({ "success": true, "run": run })))
}

#[derive(Deserialize)]
pub struct MissionsQuery {
    project: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    mission_type: Option<String>,
    search: Option<String>,
}

pub async fn missions_list(
    State(state): State<HttpState>,
    Query(query): Query<MissionsQuery>,
) -> Result<Json<Vec<Mission>>, HttpError> {
    let filter = MissionFilter {
        project: query.project,
        status: query.status,
        mission_type: query.mission_type,
        search: query.search,
    };
    let missions = state.services.missions.list(&filter)?;
    Ok(Json(missions))
}

pub async fn mission_detail(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
) -> Result<Json<MissionDetail>, HttpError> {
    let detail = state.services.missions.detail(id)?;
    Ok(Json(detail))
}

pub async fn mission_update(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
    Json(changes): Json<MissionChanges>,
) -> Result<Json<Mission>, HttpError> {
    let mission = state.services.missions.update(id, &changes)?;
    Ok(Json(mission))
}

pub async fn projects(State(state): State<HttpState>) -> Result<Json<Vec<String>>, HttpError> {
    let projects = state.services.missions.projects()?;
    Ok(Json(projects))
}

pub async fn repos(State(state): State<HttpState>) -> Result<Json<Vec<Repo>>, HttpError> {
    let repos = state.services.missions.repos()?;
    Ok(Json(repos))
}

#[derive(Deserialize)]
pub struct CostsQuery {
    days: Option<u32>,
    start: Option<String>,
    end: Option<String>,
}

pub async fn costs(
    State(state): State<HttpState>,
    Query(query): Query<CostsQuery>,
) -> Result<Json<Vec<DailyCostBucket>>, HttpError> {
    if let (Some(start), Some(end)) = (&query.start, &query.end) {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let buckets = state.services.costs.range(start, end).await?;
        return Ok(Json(buckets));
    }
    let days = query
        .days
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);
    let buckets = state.services.costs.daily(days).await?;
    Ok(Json(buckets))
}

fn parse_date(value: &str) -> Result<NaiveDate, HttpError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| HttpError::bad_request(format!("invalid date {value:?}, expected YYYY-MM-DD")))
}

pub async fn summary_today(
    State(state): State<HttpState>,
) -> Result<Json<TodaySummary>, HttpError> {
    let summary = state.services.events.today_summary()?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
pub struct EventsQuery {
    limit: Option<u32>,
    since: Option<String>,
}

pub async fn events(
    State(state): State<HttpState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<OpsEvent>>, HttpError> {
    let events = state
        .services
        .events
        .list(query.limit, query.since.as_deref())?;
    Ok(Json(events))
}

/// SSE stream over the live feed: an initial frame, then one frame per
/// batch of newly admitted entries, with comment heartbeats in between.
/// Dropping the connection drops the stream, which aborts the poll task.
pub async fn events_stream(
    State(state): State<HttpState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = tokio::sync::mpsc::channel(32);
    let feed = LogFeed::spawn(state.services.events.clone(), tx);
    let mut first = true;
    let stream = ReceiverStream::new(rx).map(move |entries| {
        let _keep_polling = &feed;
        let kind = if first { "initial" } else { "update" };
        first = false;
        let payload = serde_json::json!({ "type": kind, "entries": entries });
        Ok(Event::default().data(payload.to_string()))
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(SSE_HEARTBEAT).text("heartbeat"))
}

pub async fn pull_requests(
    State(state): State<HttpState>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let prs: Vec<PullRequest> = state.services.pulls.list().await?;
    Ok(Json(serde_json::json!({ "prs": prs })))
}

#[derive(Deserialize)]
pub struct OpsLogQuery {
    lines: Option<usize>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub async fn ops_log(
    State(state): State<HttpState>,
    Query(query): Query<OpsLogQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let entries = state
        .services
        .ops_log
        .tail(query.lines, query.kind.as_deref())?;
    Ok(Json(serde_json::json!({ "entries": entries })))
}
