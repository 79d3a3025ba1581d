use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Session, TrackerMode};
use crate::tracker::RunState;

/// Every tracker state change produces an Event.
/// The CLI prints them; a GUI layer would poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TrackerStarted {
        mode: TrackerMode,
        /// Fixed countdown length for this run (timer mode only).
        timer_duration_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    TrackerStopped {
        session: Session,
        at: DateTime<Utc>,
    },
    /// The in-progress interval was discarded without recording a session.
    TrackerReset {
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: TrackerMode,
        to: TrackerMode,
        /// Session closed by the implicit stop, if one was running.
        closed: Option<Session>,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero and auto-stopped.
    TimerExpired {
        session: Session,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TrackerMode,
        state: RunState,
        elapsed_secs: u64,
        remaining_secs: u64,
        /// `HH:MM:SS` rendering of the active counter (elapsed for stopwatch,
        /// remaining for timer).
        display: String,
        at: DateTime<Utc>,
    },
}
