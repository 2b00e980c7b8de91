//! Environment-driven configuration, loaded once at startup into an
//! immutable value. Every variable has a fixed default so the dashboard
//! runs unconfigured against a local agent workspace.

use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use opsboard_core::PricingTable;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

const DEFAULT_REPOS: &[&str] = &[
    "engage-api",
    "engage-media-frontend",
    "db-mcp",
    "warp-bridge",
    "b1g-data-pipeline",
    "streamed-data-pipeline",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSourceKind {
    SessionsApi,
    Notes,
    SessionLogs,
}

impl FromStr for CostSourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sessions-api" => Ok(CostSourceKind::SessionsApi),
            "notes" => Ok(CostSourceKind::Notes),
            "session-logs" => Ok(CostSourceKind::SessionLogs),
            other => Err(format!("unknown cost source {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sessions_api_url: String,
    pub workspace: PathBuf,
    pub ops_log_path: PathBuf,
    pub db_path: PathBuf,
    pub repos: Vec<String>,
    pub github_owner: String,
    pub cost_source: CostSourceKind,
    pub tz: Tz,
    pub bind: String,
    pub pricing: PricingTable,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let workspace = env_var("OPSBOARD_WORKSPACE")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = env_var("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(".opsboard").join("workspace")
            });
        let ops_log_path = env_var("OPSBOARD_OPS_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace.join("memory").join("ops-log.txt"));
        let db_path = env_var("OPSBOARD_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace.join("memory").join("ops.db"));
        let repos = env_var("OPSBOARD_REPOS")
            .map(|value| {
                value
                    .split(',')
                    .map(|repo| repo.trim().to_string())
                    .filter(|repo| !repo.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_REPOS.iter().map(|r| r.to_string()).collect());
        let cost_source = env_var("OPSBOARD_COST_SOURCE")
            .and_then(|value| match value.parse() {
                Ok(kind) => Some(kind),
                Err(err) => {
                    tracing::warn!("{err}, using sessions-api");
                    None
                }
            })
            .unwrap_or(CostSourceKind::SessionsApi);
        let tz = env_var("OPSBOARD_TZ")
            .and_then(|value| match value.parse() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    tracing::warn!(value, "unknown timezone, using America/Los_Angeles");
                    None
                }
            })
            .unwrap_or(chrono_tz::America::Los_Angeles);
        let pricing = env_var("OPSBOARD_PRICING")
            .map(PathBuf::from)
            .and_then(|path| match load_pricing(&path) {
                Ok(table) => Some(table),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "pricing file unusable, using built-in rates");
                    None
                }
            })
            .unwrap_or_else(PricingTable::builtin);

        Self {
            sessions_api_url: env_var("OPSBOARD_SESSIONS_API_URL")
                .unwrap_or_else(|| "http://localhost:4440".to_string()),
            workspace,
            ops_log_path,
            db_path,
            repos,
            github_owner: env_var("OPSBOARD_GITHUB_OWNER").unwrap_or_else(|| "lbelyaev".to_string()),
            cost_source,
            tz,
            bind: env_var("OPSBOARD_BIND").unwrap_or_else(|| "127.0.0.1:4450".to_string()),
            pricing,
        }
    }
}

fn load_pricing(path: &std::path::Path) -> std::result::Result<PricingTable, String> {
    let contents = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_source_kind_parses() {
        assert_eq!(
            "sessions-api".parse::<CostSourceKind>().unwrap(),
            CostSourceKind::SessionsApi
        );
        assert_eq!("notes".parse::<CostSourceKind>().unwrap(), CostSourceKind::Notes);
        assert_eq!(
            "session-logs".parse::<CostSourceKind>().unwrap(),
            CostSourceKind::SessionLogs
        );
        assert!("csv".parse::<CostSourceKind>().is_err());
    }
}
