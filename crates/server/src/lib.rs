mod errors;
mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};

pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/sessions", get(handlers::sessions))
        .route("/api/agent-runs", get(handlers::agent_runs))
        .route("/api/spawn", post(handlers::spawn))
        .route("/api/missions", get(handlers::missions_list))
        .route(
            "/api/missions/:id",
            get(handlers::mission_detail).put(handlers::mission_update),
        )
        .route("/api/projects", get(handlers::projects))
        .route("/api/repos", get(handlers::repos))
        .route("/api/costs", get(handlers::costs))
        .route("/api/summary/today", get(handlers::summary_today))
        .route("/api/events", get(handlers::events))
        .route("/api/events/stream", get(handlers::events_stream))
        .route("/api/github/prs", get(handlers::pull_requests))
        .route("/api/ops-log", get(handlers::ops_log))
        .with_state(state)
}
