//! SQLite-backed storage for the Docket register.
//!
//! One `SqliteStore` wraps one connection in WAL mode. Every multi-row
//! mutation (batch ingestion, fan-out appends, cascading removals, sequence
//! advances) runs inside a single transaction here; callers never see a
//! half-applied write.

mod events;
mod letters;
mod registry;
mod schema;

pub use events::{LedgerInsert, Retraction};
pub use letters::TransmittalSummary;
pub use registry::{EntryUpdate, EntryWithChain, IndexSummary};

use std::path::Path;
use std::str::FromStr;

use docket_core::error::{Error, Result};
use rusqlite::Connection;

/// SQLite-backed storage engine.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens an existing database. Fails with `NotFound` when the file does
    /// not exist; SQLite would otherwise silently create an empty one.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::not_found("database", db_path.display()));
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.apply_pragmas()?;
        Ok(store)
    }

    /// Opens or creates the database with full schema.
    pub fn open_or_create(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.apply_pragmas()?;
        store.apply_schema()?;
        Ok(store)
    }

    /// In-memory database with full schema. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.apply_pragmas()?;
        store.apply_schema()?;
        Ok(store)
    }

    fn apply_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        // Merge WAL back into main DB so users see a single file when idle.
        let _ = self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
    }
}

/// Parses an id column that this store wrote itself. A miss here means the
/// database was edited out of band, so it reports `Integrity`, not
/// `Validation`.
pub(crate) fn stored_id<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = Error>,
{
    value
        .parse()
        .map_err(|_| Error::integrity(format!("malformed stored id: {value}")))
}

/// Rewrites a uniqueness violation as `Conflict`; other failures stay
/// `Storage`.
pub(crate) fn constraint_to_conflict(err: rusqlite::Error, message: impl Into<String>) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::conflict(message)
        }
        _ => Error::from(err),
    }
}
