//! Open pull-request status via the `gh` CLI. Each configured repo is
//! queried concurrently; a repo whose query fails contributes an empty
//! list instead of failing the whole view.

use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::warn;

use opsboard_core::PullRequest;

use crate::error::Result;
use crate::services::SharedConfig;

const GH_TIMEOUT: Duration = Duration::from_secs(15);
const PR_LIMIT: &str = "10";

#[derive(Debug, Deserialize)]
struct RawAuthor {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawCheck {
    #[serde(default)]
    conclusion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPr {
    number: i64,
    title: String,
    #[serde(default)]
    author: Option<RawAuthor>,
    state: String,
    #[serde(default)]
    status_check_rollup: Option<Vec<RawCheck>>,
    url: String,
    created_at: String,
    updated_at: String,
}

/// Collapses a PR's check conclusions into one status: any failure wins,
/// then a fully green set, then anything still awaiting a conclusion.
fn ci_rollup(checks: &[RawCheck]) -> &'static str {
    if checks.is_empty() {
        return "unknown";
    }
    let has_failure = checks
        .iter()
        .any(|check| check.conclusion.as_deref() == Some("FAILURE"));
    if has_failure {
        return "failure";
    }
    let all_success = checks
        .iter()
        .all(|check| check.conclusion.as_deref() == Some("SUCCESS"));
    if all_success {
        return "success";
    }
    if checks.iter().any(|check| check.conclusion.is_none()) {
        return "pending";
    }
    "unknown"
}

fn to_pull_request(repo: &str, raw: RawPr) -> PullRequest {
    let ci_status = raw
        .status_check_rollup
        .as_deref()
        .map(ci_rollup)
        .unwrap_or("unknown");
    PullRequest {
        repo: repo.to_string(),
        number: raw.number,
        title: raw.title,
        author: raw
            .author
            .map(|author| author.login)
            .unwrap_or_else(|| "unknown".to_string()),
        state: raw.state,
        ci_status: ci_status.to_string(),
        url: raw.url,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    }
}

async fn fetch_repo(owner: String, repo: String) -> Vec<PullRequest> {
    let command = Command::new("gh")
        .args([
            "pr",
            "list",
            "--repo",
            &format!("{owner}/{repo}"),
            "--json",
            "number,title,author,state,statusCheckRollup,url,createdAt,updatedAt",
            "--limit",
            PR_LIMIT,
        ])
        .output();
    let output = match timeout(GH_TIMEOUT, command).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            warn!(repo, error = %err, "gh invocation failed");
            return Vec::new();
        }
        Err(_) => {
            warn!(repo, "gh timed out");
            return Vec::new();
        }
    };
    if !output.status.success() {
        warn!(repo, status = %output.status, "gh exited nonzero");
        return Vec::new();
    }
    match serde_json::from_slice::<Vec<RawPr>>(&output.stdout) {
        Ok(raw_prs) => raw_prs
            .into_iter()
            .map(|raw| to_pull_request(&repo, raw))
            .collect(),
        Err(err) => {
            warn!(repo, error = %err, "gh output unreadable");
            Vec::new()
        }
    }
}

#[derive(Clone)]
pub struct PullsService {
    config: SharedConfig,
}

impl PullsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub async fn list(&self) -> Result<Vec<PullRequest>> {
        let mut set = JoinSet::new();
        for repo in &self.config.repos {
            set.spawn(fetch_repo(self.config.github_owner.clone(), repo.clone()));
        }
        let mut prs = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(repo_prs) => prs.extend(repo_prs),
                Err(err) => warn!(error = %err, "pr fetch task panicked"),
            }
        }
        prs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(prs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(conclusion: Option<&str>) -> RawCheck {
        RawCheck {
            conclusion: conclusion.map(str::to_string),
        }
    }

    #[test]
    fn rollup_failure_wins() {
        let checks = vec![check(Some("SUCCESS")), check(Some("FAILURE")), check(None)];
        assert_eq!(ci_rollup(&checks), "failure");
    }

    #[test]
    fn rollup_all_success() {
        let checks = vec![check(Some("SUCCESS")), check(Some("SUCCESS"))];
        assert_eq!(ci_rollup(&checks), "success");
    }

    #[test]
    fn rollup_missing_conclusion_is_pending() {
        let checks = vec![check(Some("SUCCESS")), check(None)];
        assert_eq!(ci_rollup(&checks), "pending");
    }

    #[test]
    fn rollup_unknown_cases() {
        assert_eq!(ci_rollup(&[]), "unknown");
        // Concluded but neither failed nor fully green, e.g. SKIPPED.
        let checks = vec![check(Some("SKIPPED")), check(Some("SUCCESS"))];
        assert_eq!(ci_rollup(&checks), "unknown");
    }

    #[test]
    fn raw_pr_parses_gh_json() {
        let json = r#"[{
            "number": 12,
            "title": "Fix login redirect",
            "author": {"login": "octo"},
            "state": "OPEN",
            "statusCheckRollup": [{"conclusion": "SUCCESS"}],
            "url": "https://example.test/pr/12",
            "createdAt": "2026-03-01T10:00:00Z",
            "updatedAt": "2026-03-01T11:00:00Z"
        }]"#;
        let raw: Vec<RawPr> = serde_json::from_str(json).unwrap();
        let pr = to_pull_request("engage-api", raw.into_iter().next().unwrap());
        assert_eq!(pr.repo, "engage-api");
        assert_eq!(pr.author, "octo");
        assert_eq!(pr.ci_status, "success");
    }
}
