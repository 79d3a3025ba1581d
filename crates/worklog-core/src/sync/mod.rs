mod client;

pub use client::{ReplaceSummary, SyncClient};
