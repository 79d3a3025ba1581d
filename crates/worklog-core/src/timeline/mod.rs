mod slots;

pub use slots::{build_today_timeline, HourSlot};
