//! SQLite-based session archive.
//!
//! Provides persistent storage for:
//! - Closed sessions (the archive the aggregation layer reads)
//! - A key-value store holding the tracker's resumption state
//!
//! Only closed sessions are ever inserted; an in-progress run lives in the
//! kv store as the serialized tracker engine, never in the sessions table.

use std::path::Path;

use indoc::indoc;
use rusqlite::{params, Connection};

use crate::error::{DatabaseError, Result};
use crate::session::{Session, TrackerMode};

use super::data_dir;

/// kv key under which the serialized tracker engine is persisted.
pub const TRACKER_STATE_KEY: &str = "tracker_state";

/// SQLite database for the session archive.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/worklog/worklog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("worklog.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS sessions (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    start_ms      INTEGER NOT NULL,
                    end_ms        INTEGER NOT NULL,
                    duration_secs INTEGER NOT NULL,
                    mode          TEXT NOT NULL,
                    date          TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_start_ms ON sessions(start_ms);
                CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
            "})
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Append one closed session to the archive.
    pub fn insert_session(&self, session: &Session) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO sessions (start_ms, end_ms, duration_secs, mode, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session.start_time,
                    session.end_time,
                    session.duration,
                    session.mode.as_str(),
                    session.date,
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every stored session, ordered by start time ascending.
    pub fn all_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT start_ms, end_ms, duration_secs, mode, date
                 FROM sessions ORDER BY start_ms ASC",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                let mode: String = row.get(3)?;
                Ok(Session {
                    start_time: row.get(0)?,
                    end_time: row.get(1)?,
                    duration: row.get(2)?,
                    // Unrecognized mode text degrades to stopwatch instead of
                    // poisoning the whole archive read.
                    mode: TrackerMode::parse(&mode).unwrap_or(TrackerMode::Stopwatch),
                    date: row.get(4)?,
                })
            })
            .map_err(DatabaseError::from)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row.map_err(DatabaseError::from)?);
        }
        Ok(sessions)
    }

    /// Atomically discard every stored session and store the given list
    /// verbatim. Empty input is valid and clears the archive.
    pub fn replace_all(&mut self, sessions: &[Session]) -> Result<usize> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;
        tx.execute("DELETE FROM sessions", [])
            .map_err(DatabaseError::from)?;
        for session in sessions {
            tx.execute(
                "INSERT INTO sessions (start_ms, end_ms, duration_secs, mode, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session.start_time,
                    session.end_time,
                    session.duration,
                    session.mode.as_str(),
                    session.date,
                ],
            )
            .map_err(DatabaseError::from)?;
        }
        tx.commit().map_err(DatabaseError::from)?;
        Ok(sessions.len())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(DatabaseError::from)?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Remove a kv entry. Missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}
