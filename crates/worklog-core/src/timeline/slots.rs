//! Hour-by-hour occupancy of the current day.
//!
//! The day is partitioned into 24 fixed one-hour slots. Each slot's worked
//! minutes is the summed overlap of every session intersecting it -- closed
//! sessions plus, optionally, the live run truncated at `now`. Overlapping
//! sessions within a slot accumulate additively before the per-slot clamp to
//! 60; double-booked intervals are deliberately not merged.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::session::Session;

const HOUR_MS: i64 = 3_600_000;

/// Occupancy of one `[hour:00, hour+1:00)` window of the current day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourSlot {
    /// 0-23.
    pub hour: u8,
    /// Summed overlap clamped to [0, 60].
    pub worked_minutes: u64,
}

/// Build the 24-slot occupancy profile for the day containing `now`.
///
/// `running_start_ms`, when present, synthesizes a virtual open-ended session
/// `[start, now)` so the in-progress run shows up without being persisted.
pub fn build_today_timeline(
    sessions: &[Session],
    running_start_ms: Option<i64>,
    now: DateTime<Local>,
) -> Vec<HourSlot> {
    let day_start_ms = match now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).single())
    {
        Some(midnight) => midnight.timestamp_millis(),
        // Midnight does not exist in this zone today; an empty profile beats
        // guessing a boundary.
        None => return (0..24).map(|hour| HourSlot { hour, worked_minutes: 0 }).collect(),
    };
    let now_ms = now.timestamp_millis();

    let mut intervals: Vec<(i64, i64)> = sessions
        .iter()
        .map(|s| (s.start_time, s.end_time))
        .collect();
    if let Some(start) = running_start_ms {
        if start < now_ms {
            intervals.push((start, now_ms));
        }
    }

    (0..24)
        .map(|hour| {
            let slot_start = day_start_ms + i64::from(hour) * HOUR_MS;
            let slot_end = slot_start + HOUR_MS;
            let overlap_ms: i64 = intervals
                .iter()
                .map(|&(start, end)| (end.min(slot_end) - start.max(slot_start)).max(0))
                .sum();
            HourSlot {
                hour: hour as u8,
                worked_minutes: ((overlap_ms / 60_000) as u64).min(60),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TrackerMode;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn at(h: u32, m: u32) -> i64 {
        day()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
            .and_local_timezone(Local)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    fn now_at(h: u32, m: u32) -> DateTime<Local> {
        Local.timestamp_millis_opt(at(h, m)).single().unwrap()
    }

    fn session(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Session {
        Session::close(at(start_h, start_m), at(end_h, end_m), TrackerMode::Stopwatch)
    }

    #[test]
    fn always_yields_24_slots() {
        let slots = build_today_timeline(&[], None, now_at(12, 0));
        assert_eq!(slots.len(), 24);
        assert!(slots.iter().all(|s| s.worked_minutes == 0));
        assert_eq!(slots[23].hour, 23);
    }

    #[test]
    fn overlapping_sessions_accumulate_then_clamp_to_60() {
        // [09:00,09:30) + [09:15,10:00): raw overlap in slot 9 is 75 minutes.
        let sessions = vec![session(9, 0, 9, 30), session(9, 15, 10, 0)];
        let slots = build_today_timeline(&sessions, None, now_at(12, 0));
        assert_eq!(slots[9].worked_minutes, 60);
        assert_eq!(slots[10].worked_minutes, 0);
    }

    #[test]
    fn session_splits_across_slot_boundary() {
        let sessions = vec![session(8, 30, 9, 45)];
        let slots = build_today_timeline(&sessions, None, now_at(12, 0));
        assert_eq!(slots[8].worked_minutes, 30);
        assert_eq!(slots[9].worked_minutes, 45);
    }

    #[test]
    fn running_session_is_truncated_at_now() {
        let slots = build_today_timeline(&[], Some(at(11, 30)), now_at(12, 10));
        assert_eq!(slots[11].worked_minutes, 30);
        assert_eq!(slots[12].worked_minutes, 10);
        assert_eq!(slots[13].worked_minutes, 0);
    }

    #[test]
    fn running_session_in_the_future_is_ignored() {
        let slots = build_today_timeline(&[], Some(at(14, 0)), now_at(12, 0));
        assert!(slots.iter().all(|s| s.worked_minutes == 0));
    }

    #[test]
    fn sessions_from_other_days_do_not_leak_in() {
        let yesterday = day().pred_opt().unwrap();
        let start = yesterday
            .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
            .and_local_timezone(Local)
            .single()
            .unwrap()
            .timestamp_millis();
        let sessions = vec![Session::close(
            start,
            start + 3_600_000,
            TrackerMode::Stopwatch,
        )];
        let slots = build_today_timeline(&sessions, None, now_at(12, 0));
        assert!(slots.iter().all(|s| s.worked_minutes == 0));
    }
}
