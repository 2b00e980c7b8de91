use chrono::{NaiveDate, Utc};
use tracing::warn;

use opsboard_core::{CostRecord, DailyCostBucket, aggregate_between, aggregate_daily};
use sources::{CostSource, NoteFileSource, SessionLogSource, SessionsApiSource};

use crate::config::CostSourceKind;
use crate::error::{AppError, Result};
use crate::services::SharedConfig;

#[derive(Clone)]
pub struct CostsService {
    config: SharedConfig,
}

impl CostsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn source(&self) -> Result<Box<dyn CostSource>> {
        let pricing = self.config.pricing.clone();
        Ok(match self.config.cost_source {
            CostSourceKind::SessionsApi => Box::new(SessionsApiSource::new(
                self.config.sessions_api_url.clone(),
                pricing,
                self.config.tz,
            )?),
            CostSourceKind::Notes => Box::new(NoteFileSource::new(&self.config.workspace, pricing)),
            CostSourceKind::SessionLogs => Box::new(SessionLogSource::new(
                &self.config.workspace,
                pricing,
                self.config.tz,
            )),
        })
    }

    /// Fetches cost records from the configured source. An unreachable or
    /// broken source degrades to an empty batch, which aggregates into an
    /// all-zero window rather than an error response.
    async fn fetch_records(&self) -> Vec<CostRecord> {
        let source = match self.source() {
            Ok(source) => source,
            Err(err) => {
                warn!(error = %err, "cost source unavailable");
                return Vec::new();
            }
        };
        match source.fetch().await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "cost source fetch failed, serving a zero window");
                Vec::new()
            }
        }
    }

    pub async fn daily(&self, days: u32) -> Result<Vec<DailyCostBucket>> {
        let records = self.fetch_records().await;
        let today = Utc::now().with_timezone(&self.config.tz).date_naive();
        Ok(aggregate_daily(&records, days, today))
    }

    pub async fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyCostBucket>> {
        if end < start {
            return Err(AppError::InvalidInput(
                "end date precedes start date".to_string(),
            ));
        }
        let records = self.fetch_records().await;
        Ok(aggregate_between(&records, start, end))
    }
}
