mod engine;
mod ticker;

pub use engine::{RunState, TrackerEngine, DEFAULT_TIMER_MINUTES, STATE_VERSION};
pub use ticker::Ticker;
