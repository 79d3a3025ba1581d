//! Day-bucket aggregation.
//!
//! Sessions group by their `date` key (local calendar day of the start
//! timestamp). Rebuilt from the full session list on every query; there is no
//! incremental state to invalidate.

use std::collections::BTreeMap;

use crate::interval;
use crate::session::{DayData, Session};

/// Bucket sessions by calendar day, ascending by date.
///
/// `total_minutes` is the bucket's summed duration in whole minutes (seconds
/// are summed first, then converted, so sub-minute sessions still count).
/// Ascending order falls out of the ISO date key: lexicographic equals
/// chronological for `YYYY-MM-DD`.
pub fn group_by_day(sessions: &[Session]) -> Vec<DayData> {
    let mut buckets: BTreeMap<String, Vec<Session>> = BTreeMap::new();
    for session in sessions {
        buckets
            .entry(session.date.clone())
            .or_default()
            .push(session.clone());
    }
    buckets
        .into_iter()
        .map(|(date, sessions)| {
            let total_secs: u64 = sessions.iter().map(|s| s.duration).sum();
            DayData {
                date,
                total_minutes: total_secs / 60,
                sessions,
            }
        })
        .collect()
}

/// Total tracked time for one day, rendered as `HH:MM:SS`.
pub fn daily_total(sessions: &[Session], day: &str) -> String {
    let total_secs: u64 = sessions
        .iter()
        .filter(|s| s.date == day)
        .map(|s| s.duration)
        .sum();
    interval::format_duration(total_secs)
}
