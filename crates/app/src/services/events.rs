use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use opsboard_core::{OpsEvent, TodaySummary};
use opsboard_db::clamp_event_limit;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct EventsService {
    config: SharedConfig,
}

impl EventsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Events newest first. The limit is clamped, and an unparseable
    /// `since` value is treated as absent rather than rejected.
    pub fn list(&self, limit: Option<u32>, since: Option<&str>) -> Result<Vec<OpsEvent>> {
        let db = open_db(&self.config)?;
        let since = since.and_then(normalize_since);
        Ok(db.list_ops_events(clamp_event_limit(limit), since.as_deref())?)
    }

    pub fn today_summary(&self) -> Result<TodaySummary> {
        let db = open_db(&self.config)?;
        let (start, end) = day_bounds(Utc::now(), &self.config.tz);
        Ok(db.today_summary(&start, &end)?)
    }
}

fn normalize_since(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// UTC bounds `[start, end)` of the current day in the reference timezone.
fn day_bounds(now: DateTime<Utc>, tz: &Tz) -> (String, String) {
    let day = now.with_timezone(tz).date_naive();
    (start_of_day(day, tz), start_of_day(day + Duration::days(1), tz))
}

fn start_of_day(day: NaiveDate, tz: &Tz) -> String {
    let midnight = day.and_time(NaiveTime::MIN);
    let local = match tz.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(ts) => ts.with_timezone(&Utc),
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST gap; UTC midnight is close enough for
        // a day boundary.
        chrono::LocalResult::None => Utc.from_utc_datetime(&midnight),
    };
    local.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn day_bounds_follow_the_reference_timezone() {
        let now = "2026-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (start, end) = day_bounds(now, &Los_Angeles);
        assert_eq!(start, "2026-03-01T08:00:00.000Z");
        assert_eq!(end, "2026-03-02T08:00:00.000Z");
    }

    #[test]
    fn late_night_utc_is_still_the_local_day() {
        // 03:00 UTC on March 2nd is the evening of March 1st in Pacific.
        let now = "2026-03-02T03:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (start, _) = day_bounds(now, &Los_Angeles);
        assert_eq!(start, "2026-03-01T08:00:00.000Z");
    }

    #[test]
    fn since_normalizes_offsets_and_drops_garbage() {
        assert_eq!(
            normalize_since("2026-03-01T10:00:00+02:00").as_deref(),
            Some("2026-03-01T08:00:00.000Z")
        );
        assert!(normalize_since("not a timestamp").is_none());
    }
}
