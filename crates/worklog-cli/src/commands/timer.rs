use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use worklog_core::events::Event;
use worklog_core::session::TrackerMode;
use worklog_core::storage::database::TRACKER_STATE_KEY;
use worklog_core::storage::{Config, Database};
use worklog_core::tracker::{Ticker, TrackerEngine, DEFAULT_TIMER_MINUTES};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Begin a run in the current mode
    Start,
    /// Stop the run and record a session
    Stop,
    /// Discard the run without recording a session
    Reset,
    /// Switch between stopwatch and timer (stops a running session first)
    Switch {
        /// Target mode: stopwatch or timer
        mode: String,
    },
    /// Set the countdown length in minutes
    Set {
        /// Minutes; anything non-numeric falls back to the 25-minute default
        minutes: String,
    },
    /// Print current tracker state as JSON
    Status,
    /// Render the live display once per second until stopped or expired
    Watch,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn load_engine(db: &Database) -> TrackerEngine {
    if let Ok(Some(json)) = db.kv_get(TRACKER_STATE_KEY) {
        match TrackerEngine::from_json(&json) {
            Some(engine) => return engine,
            None => eprintln!("warning: discarding malformed tracker state"),
        }
    }
    let config = Config::load_or_default();
    TrackerEngine::new(config.timer.default_minutes)
}

fn save_engine(db: &Database, engine: &TrackerEngine) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set(TRACKER_STATE_KEY, &engine.to_json()?)?;
    Ok(())
}

/// Close out a countdown that expired while the process was away.
fn settle_expired(
    db: &Database,
    engine: &mut TrackerEngine,
    now: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(session) = engine.tick(now) {
        db.insert_session(&session)?;
        let event = Event::TimerExpired {
            session,
            at: chrono::Utc::now(),
        };
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = load_engine(&db);
    let now = now_ms();
    settle_expired(&db, &mut engine, now)?;

    match action {
        TimerAction::Start => {
            match engine.start(now) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot(now))?),
            }
        }
        TimerAction::Stop => {
            // A stop with nothing running is a no-op, not an error.
            match engine.stop(now) {
                Some(session) => {
                    db.insert_session(&session)?;
                    let event = Event::TrackerStopped {
                        session,
                        at: chrono::Utc::now(),
                    };
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot(now))?),
            }
        }
        TimerAction::Reset => {
            let event = engine.reset();
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Switch { mode } => {
            let to = TrackerMode::parse(&mode)
                .ok_or_else(|| format!("unknown mode: {mode} (expected stopwatch or timer)"))?;
            match engine.switch_mode(to, now) {
                Some(event) => {
                    if let Event::ModeSwitched {
                        closed: Some(ref session),
                        ..
                    } = event
                    {
                        db.insert_session(session)?;
                    }
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot(now))?),
            }
        }
        TimerAction::Set { minutes } => {
            let minutes = minutes
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_TIMER_MINUTES);
            if !engine.set_timer_minutes(minutes) {
                eprintln!("timer is running; duration stays fixed until it stops");
            }
            println!("{}", serde_json::to_string_pretty(&engine.snapshot(now))?);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot(now))?);
        }
        TimerAction::Watch => {
            watch(&db, &mut engine)?;
        }
    }

    save_engine(&db, &engine)?;
    Ok(())
}

/// Live 1 Hz display loop. Owns exactly one tick source, created on entry
/// and torn down on exit.
fn watch(db: &Database, engine: &mut TrackerEngine) -> Result<(), Box<dyn std::error::Error>> {
    if !engine.is_running() {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot(now_ms()))?);
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (ticker, mut ticks) = Ticker::spawn(Duration::from_secs(1));
        while ticks.recv().await.is_some() {
            let now = now_ms();
            if let Some(session) = engine.tick(now) {
                db.insert_session(&session)?;
                let event = Event::TimerExpired {
                    session,
                    at: chrono::Utc::now(),
                };
                println!();
                println!("{}", serde_json::to_string_pretty(&event)?);
                break;
            }
            if let Event::StateSnapshot { display, .. } = engine.snapshot(now) {
                print!("\r{display}");
                std::io::stdout().flush()?;
            }
        }
        ticker.cancel();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
