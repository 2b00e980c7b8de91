mod costs;
mod events;
mod missions;
mod oplog;
mod pulls;
mod runs;
mod sessions;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use opsboard_db::Db;

pub use costs::CostsService;
pub use events::EventsService;
pub use missions::{MissionDetail, MissionsService};
pub use oplog::OpsLogService;
pub use pulls::PullsService;
pub use runs::{AgentRunsView, MissionSummary, RunsService, SpawnRequest};
pub use sessions::{SessionStats, SessionTokens, SessionView, SessionsService, SessionsView};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub costs: CostsService,
    pub events: EventsService,
    pub missions: MissionsService,
    pub ops_log: OpsLogService,
    pub pulls: PullsService,
    pub runs: RunsService,
    pub sessions: SessionsService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            costs: CostsService::new(shared.clone()),
            events: EventsService::new(shared.clone()),
            missions: MissionsService::new(shared.clone()),
            ops_log: OpsLogService::new(shared.clone()),
            pulls: PullsService::new(shared.clone()),
            runs: RunsService::new(shared.clone()),
            sessions: SessionsService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open_read_only(&config.db_path)?)
}

fn open_db_rw(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

fn missing_mission(id: i64) -> AppError {
    AppError::NotFound(format!("mission {id} not found"))
}
