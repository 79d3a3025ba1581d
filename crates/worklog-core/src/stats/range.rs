//! Rolling time-window filtering.
//!
//! A [`Range`] boundary is the observation day's local midnight walked back
//! zero days, seven days, one calendar month, or one calendar year. Month and
//! year arithmetic is calendar-aware (a "month" back from March 31st lands on
//! the last day of February), not a fixed span of days.

use chrono::{DateTime, Days, Local, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Range {
    Today,
    Week,
    Month,
    Year,
}

impl Range {
    pub fn as_str(&self) -> &'static str {
        match self {
            Range::Today => "today",
            Range::Week => "week",
            Range::Month => "month",
            Range::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "today" => Some(Range::Today),
            "week" => Some(Range::Week),
            "month" => Some(Range::Month),
            "year" => Some(Range::Year),
            _ => None,
        }
    }
}

/// First calendar day inside the window ending on `today`.
pub fn range_start(range: Range, today: NaiveDate) -> NaiveDate {
    match range {
        Range::Today => today,
        Range::Week => today.checked_sub_days(Days::new(7)).unwrap_or(today),
        Range::Month => today.checked_sub_months(Months::new(1)).unwrap_or(today),
        Range::Year => today.checked_sub_months(Months::new(12)).unwrap_or(today),
    }
}

/// Keep sessions starting at or after the window boundary.
///
/// The boundary is a local midnight, so membership reduces to comparing the
/// session's local start *date* against the boundary date -- which also makes
/// a session starting exactly at the boundary inclusive.
pub fn filter_by_range(sessions: &[Session], range: Range, now: DateTime<Local>) -> Vec<Session> {
    let start = range_start(range, now.date_naive());
    sessions
        .iter()
        .filter(|s| matches!(local_day(s.start_time), Some(day) if day >= start))
        .cloned()
        .collect()
}

fn local_day(ms: i64) -> Option<NaiveDate> {
    Local.timestamp_millis_opt(ms).single().map(|dt| dt.date_naive())
}
