//! # Worklog Core Library
//!
//! This library provides the core business logic for Worklog, a personal
//! time tracker. It implements a CLI-first philosophy: every operation is
//! available through the standalone CLI binary, and any richer presentation
//! layer would be a thin shell over the same library.
//!
//! ## Architecture
//!
//! - **Tracker Engine**: a wall-clock-based state machine over mode
//!   (stopwatch / timer) and run state (idle / running); the caller supplies
//!   `now` and drives `tick()` periodically
//! - **Aggregation**: pure day-bucket grouping, rolling range filters, and
//!   the 24-slot occupancy timeline for the current day
//! - **Storage**: SQLite session archive plus a kv slot holding the engine's
//!   versioned resumption state; TOML configuration
//! - **Sync**: bulk list/replace of the full session list against a remote
//!   store, off the hot path
//!
//! ## Key Components
//!
//! - [`TrackerEngine`]: the tracker state machine
//! - [`Database`]: session archive and resumption persistence
//! - [`SyncClient`]: the remote store's two-operation contract
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod interval;
pub mod session;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod timeline;
pub mod tracker;

pub use error::{ConfigError, CoreError, DatabaseError, SyncError};
pub use events::Event;
pub use session::{DayData, Session, TrackerMode};
pub use stats::Range;
pub use storage::{Config, Database};
pub use sync::{ReplaceSummary, SyncClient};
pub use timeline::HourSlot;
pub use tracker::{RunState, Ticker, TrackerEngine};
