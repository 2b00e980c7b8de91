//! Live ops-event feed: one cooperative poll task feeding a buffer that
//! coalesces near-duplicate entries, plus the pure view state for the
//! unread counter.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use opsboard_core::{FeedEntry, OpsEvent, is_near_duplicate};

use crate::services::EventsService;

pub const FEED_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Retained-buffer cap; the oldest entries fall off first.
pub const FEED_CAPACITY: usize = 500;
pub const NEAR_BOTTOM_PX: f64 = 100.0;

// Dedup only looks this far back into the buffer; the window is 2s, so
// anything deeper is long out of range.
const DEDUP_LOOKBACK: usize = 50;

fn to_feed_entry(event: &OpsEvent) -> Option<FeedEntry> {
    let timestamp = DateTime::parse_from_rfc3339(&event.timestamp)
        .ok()?
        .with_timezone(&Utc);
    Some(FeedEntry {
        id: event.id,
        timestamp,
        kind: event.category.clone(),
        message: event.event.clone(),
    })
}

/// Feed buffer state. `watermark` is the stored timestamp of the most
/// recently accepted entry and is passed back as `since` on the next
/// poll; ids already admitted are never re-admitted even though the
/// watermark query is inclusive.
#[derive(Debug, Default)]
pub struct FeedState {
    entries: Vec<FeedEntry>,
    seen: HashSet<i64>,
    watermark: Option<String>,
}

impl FeedState {
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }

    /// Merges one poll batch (as returned by the store, newest first) and
    /// returns the entries that were actually admitted, oldest first.
    pub fn merge(&mut self, events: &[OpsEvent]) -> Vec<FeedEntry> {
        let mut incoming: Vec<(&OpsEvent, FeedEntry)> = events
            .iter()
            .filter_map(|event| {
                let entry = to_feed_entry(event);
                if entry.is_none() {
                    debug!(id = event.id, "skipping event with unparseable timestamp");
                }
                entry.map(|entry| (event, entry))
            })
            .collect();
        incoming.sort_by_key(|(_, entry)| (entry.timestamp, entry.id));

        let mut accepted = Vec::new();
        for (event, entry) in incoming {
            if self.seen.contains(&entry.id) {
                continue;
            }
            self.seen.insert(entry.id);
            self.watermark = Some(event.timestamp.clone());
            let duplicate = self
                .entries
                .iter()
                .rev()
                .take(DEDUP_LOOKBACK)
                .any(|existing| is_near_duplicate(&entry, existing));
            if duplicate {
                continue;
            }
            self.entries.push(entry.clone());
            accepted.push(entry);
        }
        if self.entries.len() > FEED_CAPACITY {
            let overflow = self.entries.len() - FEED_CAPACITY;
            self.entries.drain(..overflow);
        }
        accepted
    }
}

/// Scroll-position bookkeeping for the feed: when the reader sits near
/// the bottom the view auto-advances; otherwise appended entries count as
/// unread until the next scroll to the bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedView {
    unread: usize,
    distance_from_bottom: f64,
}

impl FeedView {
    pub fn near_bottom(&self) -> bool {
        self.distance_from_bottom <= NEAR_BOTTOM_PX
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn on_scroll(&mut self, distance_from_bottom: f64) {
        self.distance_from_bottom = distance_from_bottom;
        if self.near_bottom() {
            self.unread = 0;
        }
    }

    pub fn on_append(&mut self, count: usize) {
        if !self.near_bottom() {
            self.unread += count;
        }
    }
}

/// Background poll task pushing admitted entries to a channel. The task
/// exits when the receiver is dropped and can be aborted explicitly; the
/// interval uses `Delay` so a slow cycle postpones the next tick instead
/// of stacking up.
pub struct LogFeed {
    handle: JoinHandle<()>,
}

impl LogFeed {
    pub fn spawn(events: EventsService, tx: mpsc::Sender<Vec<FeedEntry>>) -> Self {
        let handle = tokio::spawn(async move {
            let mut state = FeedState::default();
            let mut ticker = time::interval(FEED_POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first cycle always pushes, even an empty batch, so a
            // subscriber gets its initial snapshot promptly.
            let mut first = true;
            loop {
                ticker.tick().await;
                let batch = match events.list(None, state.watermark()) {
                    Ok(batch) => batch,
                    Err(err) => {
                        warn!(error = %err, "feed poll failed");
                        continue;
                    }
                };
                let admitted = state.merge(&batch);
                if admitted.is_empty() && !first {
                    continue;
                }
                first = false;
                if tx.send(admitted).await.is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for LogFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, ts: &str, category: &str, message: &str) -> OpsEvent {
        OpsEvent {
            id,
            timestamp: ts.to_string(),
            category: category.to_string(),
            event: message.to_string(),
            mission_id: None,
            agent_run_id: None,
            pr_id: None,
            repo_id: None,
        }
    }

    #[test]
    fn merge_admits_ascending_and_sets_the_watermark() {
        let mut state = FeedState::default();
        let admitted = state.merge(&[
            event(2, "2026-03-01T10:00:10Z", "run", "run finished"),
            event(1, "2026-03-01T10:00:00Z", "mission", "mission started"),
        ]);
        assert_eq!(admitted.len(), 2);
        assert_eq!(admitted[0].id, 1);
        assert_eq!(state.watermark(), Some("2026-03-01T10:00:10Z"));
    }

    #[test]
    fn merge_is_idempotent_by_id() {
        let mut state = FeedState::default();
        let batch = vec![event(1, "2026-03-01T10:00:00Z", "run", "run started")];
        assert_eq!(state.merge(&batch).len(), 1);
        assert!(state.merge(&batch).is_empty());
        assert_eq!(state.entries().len(), 1);
    }

    #[test]
    fn near_duplicates_in_the_window_are_coalesced() {
        let mut state = FeedState::default();
        state.merge(&[event(1, "2026-03-01T10:00:00Z", "tool", "tool_call: exec step 1")]);
        let admitted = state.merge(&[event(2, "2026-03-01T10:00:01Z", "tool", "tool_call: exec step 2")]);
        assert!(admitted.is_empty());
        assert_eq!(state.entries().len(), 1);
        // The suppressed entry still advances the watermark.
        assert_eq!(state.watermark(), Some("2026-03-01T10:00:01Z"));
    }

    #[test]
    fn the_same_tool_outside_the_window_is_retained() {
        let mut state = FeedState::default();
        state.merge(&[event(1, "2026-03-01T10:00:00Z", "tool", "tool_call: exec step 1")]);
        let admitted = state.merge(&[event(2, "2026-03-01T10:00:05Z", "tool", "tool_call: exec step 2")]);
        assert_eq!(admitted.len(), 1);
        assert_eq!(state.entries().len(), 2);
    }

    #[test]
    fn buffer_is_capped() {
        let mut state = FeedState::default();
        for i in 0..(FEED_CAPACITY as i64 + 40) {
            // Spread entries a minute apart so dedup never kicks in.
            let ts = chrono::DateTime::from_timestamp(1_772_360_000 + i * 60, 0)
                .unwrap()
                .to_rfc3339();
            state.merge(&[event(i, &ts, "run", &format!("cycle {i}"))]);
        }
        assert_eq!(state.entries().len(), FEED_CAPACITY);
        assert_eq!(state.entries()[0].id, 40);
    }

    #[test]
    fn unread_counts_only_when_scrolled_away() {
        let mut view = FeedView::default();
        assert!(view.near_bottom());
        view.on_append(3);
        assert_eq!(view.unread(), 0);

        view.on_scroll(400.0);
        view.on_append(2);
        view.on_append(1);
        assert_eq!(view.unread(), 3);

        // 80px is within the near-bottom threshold.
        view.on_scroll(80.0);
        assert_eq!(view.unread(), 0);
        view.on_append(5);
        assert_eq!(view.unread(), 0);
    }
}
