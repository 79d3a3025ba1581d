//! Sync subcommand for the remote session store.
//!
//! Push and pull always move the full session list. A failed sync leaves
//! the local archive untouched -- local state stays the source of truth.

use clap::Subcommand;
use worklog_core::storage::{Config, Database};
use worklog_core::sync::SyncClient;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Replace the remote store with the local session list
    Push,
    /// Replace the local archive with the remote session list
    Pull,
    /// Show sync target and local archive size
    Status,
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut db = Database::open()?;

    match action {
        SyncAction::Push => {
            let sessions = db.all_sessions()?;
            let client = SyncClient::new(&config.sync.server_url)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let summary = runtime.block_on(client.replace_all(&sessions))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        SyncAction::Pull => {
            let client = SyncClient::new(&config.sync.server_url)?;
            let runtime = tokio::runtime::Runtime::new()?;
            // Fetch fully before touching the local archive, so a failed
            // pull changes nothing.
            let sessions = runtime.block_on(client.list_all())?;
            let count = db.replace_all(&sessions)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "pulled": count }))?
            );
        }
        SyncAction::Status => {
            let status = serde_json::json!({
                "serverUrl": config.sync.server_url,
                "localSessions": db.all_sessions()?.len(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}
