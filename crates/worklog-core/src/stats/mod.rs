//! Aggregation over the session list.
//!
//! Everything here is pure and idempotent: the same session list always
//! produces the same buckets, and inputs are never mutated.

mod day;
mod range;

pub use day::{daily_total, group_by_day};
pub use range::{filter_by_range, range_start, Range};
