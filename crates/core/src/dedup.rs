use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::FeedEntry;

/// Two entries within this many milliseconds of each other are candidates
/// for coalescing.
pub const DUPLICATE_WINDOW_MS: i64 = 2_000;

const PREFIX_LEN: usize = 20;

static TOOL_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tool_call: (\w+)").expect("tool_call pattern"));

/// The tool name from a `tool_call: <name>` marker, if present.
pub fn tool_name(message: &str) -> Option<&str> {
    TOOL_CALL
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Heuristic duplicate check used to coalesce rapid repeated status lines
/// from the same underlying action.
///
/// Entries match when they share a category, their timestamps are within
/// [`DUPLICATE_WINDOW_MS`], and either both carry the same extracted tool
/// name (for `tool` events) or one message's first 20 characters appear,
/// case-insensitively, inside the other. The containment check is known to
/// be broad: two genuinely distinct same-category events with a long
/// shared prefix inside the window will be wrongly merged.
pub fn is_near_duplicate(candidate: &FeedEntry, existing: &FeedEntry) -> bool {
    if candidate.kind != existing.kind {
        return false;
    }
    let diff_ms = (candidate.timestamp - existing.timestamp)
        .num_milliseconds()
        .abs();
    if diff_ms > DUPLICATE_WINDOW_MS {
        return false;
    }
    if candidate.kind == "tool" {
        return match (tool_name(&candidate.message), tool_name(&existing.message)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    let a = candidate.message.to_lowercase();
    let b = existing.message.to_lowercase();
    let a_prefix: String = a.chars().take(PREFIX_LEN).collect();
    let b_prefix: String = b.chars().take(PREFIX_LEN).collect();
    a.contains(&b_prefix) || b.contains(&a_prefix)
}
