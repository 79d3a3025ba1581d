//! Pure interval arithmetic.
//!
//! Everything the tracker and the aggregation layer know about time passes
//! through these functions: elapsed/remaining derivation from a start
//! timestamp and an observation time, `HH:MM:SS` rendering, and the
//! local-calendar-date key used for day bucketing. No I/O, no clock reads --
//! callers supply `now`.

use chrono::{Local, TimeZone};

/// Whole seconds elapsed between `start_ms` and `now_ms`, clamped to >= 0.
pub fn elapsed_seconds(start_ms: i64, now_ms: i64) -> u64 {
    let delta_ms = now_ms.saturating_sub(start_ms).max(0);
    (delta_ms / 1000) as u64
}

/// Seconds left of a fixed `target_secs` run that began at `start_ms`.
///
/// Derived afresh from the start timestamp each call, so it stays correct
/// across missed ticks.
pub fn remaining_seconds(start_ms: i64, target_secs: u64, now_ms: i64) -> u64 {
    target_secs.saturating_sub(elapsed_seconds(start_ms, now_ms))
}

/// Render seconds as zero-padded `HH:MM:SS`.
///
/// The hours field is unbounded -- durations past 24 hours keep counting up
/// instead of wrapping.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Local-time calendar date (`YYYY-MM-DD`) of an epoch-millisecond timestamp.
///
/// This is the aggregation key: a session belongs to the day it *started* on.
pub fn local_date_string(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_floors_to_whole_seconds() {
        assert_eq!(elapsed_seconds(1_000, 3_999), 2);
        assert_eq!(elapsed_seconds(1_000, 4_000), 3);
    }

    #[test]
    fn elapsed_clamps_negative_to_zero() {
        assert_eq!(elapsed_seconds(5_000, 1_000), 0);
    }

    #[test]
    fn remaining_counts_down_from_target() {
        assert_eq!(remaining_seconds(0, 1500, 60_000), 1440);
        assert_eq!(remaining_seconds(0, 1500, 1_500_000), 0);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining_seconds(0, 10, 3_600_000), 0);
    }

    #[test]
    fn format_zero_pads() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(61), "00:01:01");
        assert_eq!(format_duration(3_661), "01:01:01");
    }

    #[test]
    fn format_does_not_wrap_at_24_hours() {
        assert_eq!(format_duration(25 * 3600), "25:00:00");
        assert_eq!(format_duration(100 * 3600 + 59), "100:00:59");
    }

    #[test]
    fn date_key_is_iso_formatted() {
        let date = local_date_string(0);
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }
}
