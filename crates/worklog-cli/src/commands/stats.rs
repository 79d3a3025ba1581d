use clap::Subcommand;
use worklog_core::interval;
use worklog_core::stats::{daily_total, filter_by_range, group_by_day, Range};
use worklog_core::storage::database::TRACKER_STATE_KEY;
use worklog_core::storage::Database;
use worklog_core::timeline::build_today_timeline;
use worklog_core::tracker::TrackerEngine;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals over a rolling window
    Summary {
        /// today, week, month, or year
        #[arg(long, default_value = "week")]
        range: String,
    },
    /// Per-day buckets over a rolling window
    Days {
        /// today, week, month, or year
        #[arg(long, default_value = "week")]
        range: String,
    },
    /// Hour-by-hour occupancy of the current day
    Timeline,
}

fn parse_range(s: &str) -> Result<Range, Box<dyn std::error::Error>> {
    Range::parse(s)
        .ok_or_else(|| format!("unknown range: {s} (expected today, week, month, or year)").into())
}

/// Settle an expired countdown the way the timer commands do, then report the
/// start of a genuinely live run. A timer whose countdown already ended is
/// archived here rather than shown as still occupying the clock.
fn settled_running_start(db: &Database) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    let Some(json) = db.kv_get(TRACKER_STATE_KEY).ok().flatten() else {
        return Ok(None);
    };
    let Some(mut engine) = TrackerEngine::from_json(&json) else {
        return Ok(None);
    };
    if let Some(session) = engine.tick(chrono::Utc::now().timestamp_millis()) {
        db.insert_session(&session)?;
        db.kv_set(TRACKER_STATE_KEY, &engine.to_json()?)?;
        return Ok(None);
    }
    if engine.is_running() {
        Ok(engine.start_ms())
    } else {
        Ok(None)
    }
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let now = chrono::Local::now();

    match action {
        StatsAction::Summary { range } => {
            let range = parse_range(&range)?;
            let sessions = db.all_sessions()?;
            let filtered = filter_by_range(&sessions, range, now);
            let total_secs: u64 = filtered.iter().map(|s| s.duration).sum();
            let summary = serde_json::json!({
                "range": range.as_str(),
                "sessions": filtered.len(),
                "totalMinutes": total_secs / 60,
                "total": interval::format_duration(total_secs),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Days { range } => {
            let range = parse_range(&range)?;
            let sessions = db.all_sessions()?;
            let days: Vec<_> = group_by_day(&filter_by_range(&sessions, range, now))
                .into_iter()
                .map(|day| {
                    serde_json::json!({
                        "date": day.date,
                        "totalMinutes": day.total_minutes,
                        "total": daily_total(&day.sessions, &day.date),
                        "sessions": day.sessions,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        StatsAction::Timeline => {
            // Settle first: the archived session lands in the listing, and the
            // live interval only covers a run that is actually still going.
            let running_start = settled_running_start(&db)?;
            let sessions = db.all_sessions()?;
            let slots = build_today_timeline(&sessions, running_start, now);
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
    }
    Ok(())
}
