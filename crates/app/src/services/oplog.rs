use opsboard_core::LogEntry;
use sources::read_tail;

use crate::error::Result;
use crate::services::SharedConfig;

pub const DEFAULT_TAIL_LINES: usize = 100;

#[derive(Clone)]
pub struct OpsLogService {
    config: SharedConfig,
}

impl OpsLogService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn tail(&self, lines: Option<usize>, kind: Option<&str>) -> Result<Vec<LogEntry>> {
        let lines = lines.unwrap_or(DEFAULT_TAIL_LINES);
        let kind = kind.filter(|kind| !kind.is_empty());
        Ok(read_tail(&self.config.ops_log_path, lines, kind)?)
    }
}
