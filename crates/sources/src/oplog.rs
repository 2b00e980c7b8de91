//! Ops-log file reader. The log is an append-only text file with lines of
//! the form `YYYY-MM-DD HH:MM | type | message`.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use opsboard_core::LogEntry;

use crate::error::Result;

static LOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2})\s*\|\s*(\S+)\s*\|\s*(.+)$")
        .expect("ops log line regex")
});

/// Parses one ops-log line. A line that doesn't match the format still
/// yields an entry, typed `unknown` with the raw text as its message, so
/// nothing in the log is silently dropped.
pub fn parse_line(line: &str) -> LogEntry {
    match LOG_LINE.captures(line) {
        Some(caps) => LogEntry {
            timestamp: caps[1].to_string(),
            kind: caps[2].to_string(),
            message: caps[3].trim().to_string(),
            raw: line.to_string(),
        },
        None => LogEntry {
            timestamp: String::new(),
            kind: "unknown".to_string(),
            message: line.to_string(),
            raw: line.to_string(),
        },
    }
}

/// Last `lines` entries of the ops log, oldest first. The type filter
/// applies after the tail is taken, so it narrows the returned window
/// rather than reaching further back. A missing file reads as empty.
pub fn read_tail(path: &Path, lines: usize, kind: Option<&str>) -> Result<Vec<LogEntry>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut entries: Vec<LogEntry> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect();
    if entries.len() > lines {
        entries.drain(..entries.len() - lines);
    }
    if let Some(kind) = kind {
        entries.retain(|entry| entry.kind == kind);
    }
    Ok(entries)
}
