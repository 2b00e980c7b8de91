use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::types::{CostRecord, DailyCostBucket};

/// The calendar day a timestamp falls on in the dashboard's reference
/// timezone. Day bucketing is deliberately not UTC: a late-night session
/// should land on the operator's local day.
pub fn local_day(ts: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Default)]
struct DayAccumulator {
    total: f64,
    by_model: BTreeMap<String, f64>,
    by_project: BTreeMap<String, f64>,
    sessions: BTreeSet<String>,
}

/// Folds cost records into per-day buckets covering every date in
/// `[start, end]` inclusive, in ascending order.
///
/// Days with no matching records still produce a zero-valued bucket; chart
/// continuity depends on the window being complete. Session counts are the
/// cardinality of the distinct session-id set per day, so several
/// cost-bearing records from one session count once. Dollar values are
/// accumulated unrounded and rounded to cents only here, at output.
pub fn aggregate_between(
    records: &[CostRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyCostBucket> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    let mut date = start;
    while date <= end {
        days.insert(date, DayAccumulator::default());
        date += Duration::days(1);
    }

    for record in records {
        // Records outside the window are ignored, not an error.
        let Some(day) = days.get_mut(&record.date) else {
            continue;
        };
        day.total += record.amount_usd;
        *day.by_model.entry(record.model.clone()).or_insert(0.0) += record.amount_usd;
        *day.by_project.entry(record.project.clone()).or_insert(0.0) += record.amount_usd;
        day.sessions.insert(record.session_id.clone());
    }

    days.into_iter()
        .map(|(date, acc)| DailyCostBucket {
            date,
            total_usd: round_cents(acc.total),
            by_model: acc
                .by_model
                .into_iter()
                .map(|(model, value)| (model, round_cents(value)))
                .collect(),
            by_project: acc
                .by_project
                .into_iter()
                .map(|(project, value)| (project, round_cents(value)))
                .collect(),
            sessions: acc.sessions.len() as u64,
        })
        .collect()
}

/// The last `window_days` buckets ending on `today`, zero-filled.
pub fn aggregate_daily(
    records: &[CostRecord],
    window_days: u32,
    today: NaiveDate,
) -> Vec<DailyCostBucket> {
    let window_days = window_days.max(1);
    let start = today - Duration::days(i64::from(window_days) - 1);
    aggregate_between(records, start, today)
}
