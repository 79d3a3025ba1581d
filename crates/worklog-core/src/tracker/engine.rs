//! Tracker engine implementation.
//!
//! The tracker is a wall-clock-based state machine over two orthogonal axes:
//! mode (stopwatch / timer) and run state (idle / running). It has no
//! internal threads and never reads the system clock for state math -- every
//! command takes the observation time `now_ms`, and the caller is responsible
//! for calling `tick()` periodically while running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> start -> Running -> (stop | reset | switch_mode | timer expiry) -> Idle
//! ```
//!
//! Elapsed and remaining time are always recomputed from the captured start
//! timestamp, never decremented tick by tick, so a run survives missed ticks
//! and full process reloads: the serialized engine is the resumption state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::interval;
use crate::session::{Session, TrackerMode};

/// Version tag carried by the serialized engine. [`TrackerEngine::from_json`]
/// rejects any other value instead of best-effort parsing.
pub const STATE_VERSION: u32 = 1;

/// Fallback countdown length when no valid configuration is available.
pub const DEFAULT_TIMER_MINUTES: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
}

/// Core tracker state machine.
///
/// Serializable: the JSON form doubles as the resumption record persisted
/// across reloads. A deserialized engine reconstructs a running session from
/// the gap between its captured start and the caller's `now_ms`, not from any
/// ticking that happened while the process was unloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerEngine {
    version: u32,
    mode: TrackerMode,
    state: RunState,
    /// Timestamp (ms since epoch) captured by `start`. `None` while idle.
    start_ms: Option<i64>,
    /// Countdown length in seconds. Fixed for the duration of a timer run;
    /// reconfigurable (while idle) otherwise.
    timer_duration_secs: u64,
}

impl TrackerEngine {
    /// Create an idle stopwatch-mode engine with the given countdown default.
    pub fn new(timer_minutes: u64) -> Self {
        let minutes = if timer_minutes == 0 {
            DEFAULT_TIMER_MINUTES
        } else {
            timer_minutes
        };
        Self {
            version: STATE_VERSION,
            mode: TrackerMode::Stopwatch,
            state: RunState::Idle,
            start_ms: None,
            timer_duration_secs: minutes * 60,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TrackerMode {
        self.mode
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn start_ms(&self) -> Option<i64> {
        self.start_ms
    }

    pub fn timer_duration_secs(&self) -> u64 {
        self.timer_duration_secs
    }

    /// Seconds elapsed since start, 0 while idle.
    pub fn elapsed_secs(&self, now_ms: i64) -> u64 {
        match self.start_ms {
            Some(start) => interval::elapsed_seconds(start, now_ms),
            None => 0,
        }
    }

    /// Seconds left of the countdown. While idle this is the configured
    /// length, i.e. what the display shows before a run begins.
    pub fn remaining_secs(&self, now_ms: i64) -> u64 {
        match self.start_ms {
            Some(start) => {
                interval::remaining_seconds(start, self.timer_duration_secs, now_ms)
            }
            None => self.timer_duration_secs,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: i64) -> Event {
        let elapsed = self.elapsed_secs(now_ms);
        let remaining = self.remaining_secs(now_ms);
        let display = match self.mode {
            TrackerMode::Stopwatch => interval::format_duration(elapsed),
            TrackerMode::Timer => interval::format_duration(remaining),
        };
        Event::StateSnapshot {
            mode: self.mode,
            state: self.state,
            elapsed_secs: elapsed,
            remaining_secs: remaining,
            display,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run, capturing `now_ms` as the start timestamp.
    ///
    /// In timer mode the current countdown length is fixed for this run.
    /// Returns `None` if already running.
    pub fn start(&mut self, now_ms: i64) -> Option<Event> {
        if self.state == RunState::Running {
            return None;
        }
        self.state = RunState::Running;
        self.start_ms = Some(now_ms);
        Some(Event::TrackerStarted {
            mode: self.mode,
            timer_duration_secs: match self.mode {
                TrackerMode::Timer => Some(self.timer_duration_secs),
                TrackerMode::Stopwatch => None,
            },
            at: Utc::now(),
        })
    }

    /// Close the active run into a [`Session`] and return to idle.
    ///
    /// In timer mode the end is clamped to the countdown expiry, so a stop
    /// that arrives late (throttled caller, resumed process) still records
    /// exactly the configured duration. With no active start this is a no-op,
    /// guarding against double-stop races between the expiry path and a
    /// manual stop in the same tick.
    pub fn stop(&mut self, now_ms: i64) -> Option<Session> {
        let start = match (self.state, self.start_ms) {
            (RunState::Running, Some(start)) => start,
            _ => return None,
        };
        let end_ms = match self.mode {
            TrackerMode::Stopwatch => now_ms,
            TrackerMode::Timer => {
                now_ms.min(start + self.timer_duration_secs as i64 * 1000)
            }
        };
        let session = Session::close(start, end_ms, self.mode);
        self.state = RunState::Idle;
        self.start_ms = None;
        Some(session)
    }

    /// Call once per second of wall-clock time while running.
    ///
    /// In timer mode, when the remaining time derived from the fixed start
    /// reaches zero the engine auto-stops and yields the closed session.
    /// Also the settling call after resumption: a reloaded timer already past
    /// expiry closes here instead of displaying zero forever.
    pub fn tick(&mut self, now_ms: i64) -> Option<Session> {
        if self.state != RunState::Running || self.mode != TrackerMode::Timer {
            return None;
        }
        if self.remaining_secs(now_ms) == 0 {
            return self.stop(now_ms);
        }
        None
    }

    /// Discard the in-progress interval without recording a session.
    pub fn reset(&mut self) -> Event {
        self.state = RunState::Idle;
        self.start_ms = None;
        Event::TrackerReset { at: Utc::now() }
    }

    /// Change mode, implicitly stopping first if running.
    ///
    /// The closed session (if any) carries the *previous* mode. Returns
    /// `None` when the requested mode is already active.
    pub fn switch_mode(&mut self, to: TrackerMode, now_ms: i64) -> Option<Event> {
        if to == self.mode {
            return None;
        }
        let from = self.mode;
        let closed = self.stop(now_ms);
        self.mode = to;
        Some(Event::ModeSwitched {
            from,
            to,
            closed,
            at: Utc::now(),
        })
    }

    /// Reconfigure the countdown length. Only honored while idle -- a running
    /// timer keeps the duration fixed at start.
    pub fn set_timer_minutes(&mut self, minutes: u64) -> bool {
        if self.state == RunState::Running {
            return false;
        }
        let minutes = if minutes == 0 {
            DEFAULT_TIMER_MINUTES
        } else {
            minutes
        };
        self.timer_duration_secs = minutes * 60;
        true
    }

    // ── Resumption ───────────────────────────────────────────────────

    /// Serialize for the resumption store.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Reconstruct a persisted engine, or `None` for anything malformed.
    ///
    /// Rejected shapes: unparseable JSON, an unrecognized version tag, a
    /// running state without a start timestamp (or the reverse), a zero
    /// countdown length. Callers fall back to the idle default.
    pub fn from_json(json: &str) -> Option<Self> {
        let engine: TrackerEngine = serde_json::from_str(json).ok()?;
        if engine.version != STATE_VERSION {
            return None;
        }
        let consistent = match engine.state {
            RunState::Running => engine.start_ms.is_some(),
            RunState::Idle => engine.start_ms.is_none(),
        };
        if !consistent || engine.timer_duration_secs == 0 {
            return None;
        }
        Some(engine)
    }
}

impl Default for TrackerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn start_stop_records_exact_duration() {
        let mut engine = TrackerEngine::default();
        assert!(engine.start(T0).is_some());
        assert!(engine.is_running());

        let session = engine.stop(T0 + 90_000).unwrap();
        assert_eq!(session.duration, 90);
        assert_eq!(session.end_time - session.start_time, 90_000);
        assert_eq!(session.mode, TrackerMode::Stopwatch);
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut engine = TrackerEngine::default();
        engine.start(T0);
        assert!(engine.start(T0 + 1_000).is_none());
        // The original start timestamp survives.
        assert_eq!(engine.start_ms(), Some(T0));
    }

    #[test]
    fn stop_without_start_is_noop() {
        let mut engine = TrackerEngine::default();
        assert!(engine.stop(T0).is_none());

        engine.start(T0);
        assert!(engine.stop(T0 + 1_000).is_some());
        // Double stop: the second one must not fabricate a session.
        assert!(engine.stop(T0 + 2_000).is_none());
    }

    #[test]
    fn reset_discards_without_session() {
        let mut engine = TrackerEngine::default();
        engine.start(T0);
        engine.reset();
        assert_eq!(engine.state(), RunState::Idle);
        assert!(engine.stop(T0 + 5_000).is_none());
    }

    #[test]
    fn switch_mode_closes_session_under_previous_mode() {
        let mut engine = TrackerEngine::default();
        engine.start(T0);

        let event = engine.switch_mode(TrackerMode::Timer, T0 + 60_000).unwrap();
        match event {
            Event::ModeSwitched { from, to, closed, .. } => {
                assert_eq!(from, TrackerMode::Stopwatch);
                assert_eq!(to, TrackerMode::Timer);
                let session = closed.unwrap();
                assert_eq!(session.mode, TrackerMode::Stopwatch);
                assert_eq!(session.duration, 60);
            }
            other => panic!("expected ModeSwitched, got {other:?}"),
        }
        assert_eq!(engine.mode(), TrackerMode::Timer);
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[test]
    fn switch_to_same_mode_is_noop() {
        let mut engine = TrackerEngine::default();
        engine.start(T0);
        assert!(engine.switch_mode(TrackerMode::Stopwatch, T0 + 1_000).is_none());
        assert!(engine.is_running());
    }

    #[test]
    fn timer_tick_auto_stops_at_expiry() {
        let mut engine = TrackerEngine::default();
        engine.switch_mode(TrackerMode::Timer, T0);
        engine.set_timer_minutes(1);
        engine.start(T0);

        assert!(engine.tick(T0 + 59_000).is_none());
        assert!(engine.is_running());

        // The tick lands late; the session is still clamped to the expiry.
        let session = engine.tick(T0 + 61_500).unwrap();
        assert_eq!(session.duration, 60);
        assert_eq!(session.end_time, T0 + 60_000);
        assert_eq!(session.mode, TrackerMode::Timer);
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[test]
    fn late_manual_stop_clamps_to_timer_expiry() {
        let mut engine = TrackerEngine::default();
        engine.switch_mode(TrackerMode::Timer, T0);
        engine.set_timer_minutes(1);
        engine.start(T0);

        let session = engine.stop(T0 + 300_000).unwrap();
        assert_eq!(session.duration, 60);
    }

    #[test]
    fn stopwatch_tick_never_stops() {
        let mut engine = TrackerEngine::default();
        engine.start(T0);
        assert!(engine.tick(T0 + 86_400_000).is_none());
        assert!(engine.is_running());
    }

    #[test]
    fn resumed_expired_timer_settles_into_session() {
        let mut engine = TrackerEngine::default();
        engine.switch_mode(TrackerMode::Timer, T0);
        engine.set_timer_minutes(25);
        engine.start(T0);

        let json = engine.to_json().unwrap();
        let mut resumed = TrackerEngine::from_json(&json).unwrap();
        assert!(resumed.is_running());

        // Reload happens well past expiry: the first tick closes the run
        // with exactly the configured duration.
        let session = resumed.tick(T0 + 2 * 25 * 60_000).unwrap();
        assert_eq!(session.duration, 25 * 60);
        assert_eq!(resumed.state(), RunState::Idle);
    }

    #[test]
    fn resumed_live_run_recomputes_from_start() {
        let mut engine = TrackerEngine::default();
        engine.start(T0);

        let json = engine.to_json().unwrap();
        let resumed = TrackerEngine::from_json(&json).unwrap();
        assert_eq!(resumed.elapsed_secs(T0 + 3_600_000), 3_600);
    }

    #[test]
    fn from_json_rejects_malformed_state() {
        assert!(TrackerEngine::from_json("not json").is_none());
        assert!(TrackerEngine::from_json("{}").is_none());

        // Unknown version.
        let json = r#"{"version":99,"mode":"stopwatch","state":"idle","start_ms":null,"timer_duration_secs":1500}"#;
        assert!(TrackerEngine::from_json(json).is_none());

        // Running without a start timestamp.
        let json = r#"{"version":1,"mode":"timer","state":"running","start_ms":null,"timer_duration_secs":1500}"#;
        assert!(TrackerEngine::from_json(json).is_none());

        // Idle carrying a stale start timestamp.
        let json = r#"{"version":1,"mode":"timer","state":"idle","start_ms":123,"timer_duration_secs":1500}"#;
        assert!(TrackerEngine::from_json(json).is_none());
    }

    #[test]
    fn set_timer_minutes_ignored_while_running() {
        let mut engine = TrackerEngine::default();
        engine.switch_mode(TrackerMode::Timer, T0);
        engine.set_timer_minutes(10);
        engine.start(T0);

        assert!(!engine.set_timer_minutes(1));
        assert_eq!(engine.timer_duration_secs(), 600);
    }

    #[test]
    fn snapshot_shows_remaining_for_timer() {
        let mut engine = TrackerEngine::default();
        engine.switch_mode(TrackerMode::Timer, T0);
        engine.set_timer_minutes(25);
        engine.start(T0);

        match engine.snapshot(T0 + 60_000) {
            Event::StateSnapshot {
                remaining_secs,
                display,
                state,
                ..
            } => {
                assert_eq!(remaining_secs, 24 * 60);
                assert_eq!(display, "00:24:00");
                assert_eq!(state, RunState::Running);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn idle_timer_displays_configured_duration() {
        let mut engine = TrackerEngine::default();
        engine.switch_mode(TrackerMode::Timer, T0);
        assert_eq!(engine.remaining_secs(T0), 25 * 60);
    }
}
