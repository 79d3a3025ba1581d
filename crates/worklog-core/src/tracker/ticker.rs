//! Periodic tick source.
//!
//! The engine itself is caller-driven; this is the one place a wall-clock
//! schedule lives. A [`Ticker`] delivers one `()` per period on a channel
//! until its handle is cancelled or dropped, so a consumer can never end up
//! with two live tick sources: replacing the handle kills the old stream.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cancellation handle for a spawned tick stream.
pub struct Ticker {
    task: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a tick stream with the given period.
    ///
    /// The first tick arrives one full period after the call. Missed ticks
    /// are skipped, not replayed in a burst.
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // tokio fires the first tick immediately; swallow it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        (Self { task }, rx)
    }

    /// Stop the stream. The receiver sees the channel close.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
