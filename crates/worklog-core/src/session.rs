//! Session data model.
//!
//! A [`Session`] is one completed interval of tracked work. It is immutable
//! once closed: the tracker builds it at stop time and nothing mutates it
//! afterwards. Only closed sessions ever reach storage or the sync wire --
//! an in-progress run lives solely inside the tracker engine.

use serde::{Deserialize, Serialize};

use crate::interval;

/// Tracking mode: counting up from zero or down from a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerMode {
    Stopwatch,
    Timer,
}

impl TrackerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerMode::Stopwatch => "stopwatch",
            TrackerMode::Timer => "timer",
        }
    }

    /// Parse a mode name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stopwatch" => Some(TrackerMode::Stopwatch),
            "timer" => Some(TrackerMode::Timer),
            _ => None,
        }
    }
}

/// One closed work interval.
///
/// Field names follow the wire format of the session store
/// (`GET`/`POST /sessions`): camelCase keys, epoch-millisecond timestamps,
/// duration in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// When the session started (epoch milliseconds).
    pub start_time: i64,
    /// When the session was stopped (epoch milliseconds). Never before start.
    pub end_time: i64,
    /// Whole seconds between start and end, fixed at stop time.
    pub duration: u64,
    pub mode: TrackerMode,
    /// Local calendar date of `start_time`, the day-bucket key.
    pub date: String,
}

impl Session {
    /// Close a session over `[start_ms, end_ms]`.
    ///
    /// `end_ms` earlier than `start_ms` is clamped up to `start_ms`, so a
    /// skewed clock can never produce a negative duration.
    pub fn close(start_ms: i64, end_ms: i64, mode: TrackerMode) -> Self {
        let end_ms = end_ms.max(start_ms);
        Self {
            start_time: start_ms,
            end_time: end_ms,
            duration: interval::elapsed_seconds(start_ms, end_ms),
            mode,
            date: interval::local_date_string(start_ms),
        }
    }

    pub fn duration_minutes(&self) -> u64 {
        self.duration / 60
    }
}

/// Aggregated total for one calendar day. Derived on every query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayData {
    pub date: String,
    pub total_minutes: u64,
    pub sessions: Vec<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_floors_duration_to_seconds() {
        let s = Session::close(1_000, 10_999, TrackerMode::Stopwatch);
        assert_eq!(s.duration, 9);
        assert_eq!(s.end_time - s.start_time, 9_999);
    }

    #[test]
    fn close_clamps_end_before_start() {
        let s = Session::close(10_000, 2_000, TrackerMode::Timer);
        assert_eq!(s.end_time, 10_000);
        assert_eq!(s.duration, 0);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let s = Session::close(0, 60_000, TrackerMode::Timer);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["startTime"], 0);
        assert_eq!(json["endTime"], 60_000);
        assert_eq!(json["duration"], 60);
        assert_eq!(json["mode"], "timer");
        assert!(json["date"].is_string());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(TrackerMode::parse("Timer"), Some(TrackerMode::Timer));
        assert_eq!(TrackerMode::parse("STOPWATCH"), Some(TrackerMode::Stopwatch));
        assert_eq!(TrackerMode::parse("countdown"), None);
    }
}
