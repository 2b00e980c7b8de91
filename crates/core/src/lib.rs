pub mod aggregate;
pub mod classify;
pub mod dedup;
pub mod estimate;
pub mod pricing;
pub mod types;

pub use aggregate::{aggregate_between, aggregate_daily, local_day, round_cents};
pub use classify::{MODEL_FALLBACK, PROJECT_FALLBACK, infer_project, normalize_model};
pub use dedup::{DUPLICATE_WINDOW_MS, is_near_duplicate, tool_name};
pub use estimate::estimate_cost;
pub use pricing::{ModelPrice, PricingTable};
pub use types::{
    AgentRun, CostRecord, DailyCostBucket, FeedEntry, LogEntry, Mission, MissionStatus,
    MissionStep, OpsEvent, PullRequest, Repo, RunStatus, TodaySummary,
};
