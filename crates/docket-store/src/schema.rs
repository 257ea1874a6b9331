//! Database schema.
//!
//! One table per record kind plus `ledger_events`, which holds both halves of
//! every exchange in a single row: pairedness of the transmittal and status
//! halves is structural at rest, not re-checked per write. `owner_id` points
//! at either a revision or a transmittal; the id prefix tells them apart.

use docket_core::error::Result;

use crate::SqliteStore;

pub(crate) const SCHEMA_SQL: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    client_code TEXT NOT NULL,
    contractor_code TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS doc_indexes (
    id TEXT PRIMARY KEY,
    vendor_ref TEXT NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0,
    removed_reason TEXT,
    removed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_doc_indexes_vendor ON doc_indexes(vendor_ref);

CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    index_id TEXT NOT NULL REFERENCES doc_indexes(id),
    position INTEGER NOT NULL,
    document_number TEXT NOT NULL,
    document_title TEXT NOT NULL,
    category_ref TEXT,
    target_date TEXT,
    removed INTEGER NOT NULL DEFAULT 0,
    removed_reason TEXT,
    removed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_index_pos ON entries(index_id, position);
CREATE INDEX IF NOT EXISTS idx_entries_number ON entries(index_id, document_number);

CREATE TABLE IF NOT EXISTS revisions (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL REFERENCES entries(id),
    position INTEGER NOT NULL,
    vendor_ref TEXT NOT NULL,
    category_ref TEXT,
    revision_label TEXT NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0,
    removed_reason TEXT,
    removed_at TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (entry_id, revision_label)
);

CREATE INDEX IF NOT EXISTS idx_revisions_entry_pos ON revisions(entry_id, position);

CREATE TABLE IF NOT EXISTS ledger_events (
    owner_id TEXT NOT NULL,
    seq INTEGER NOT NULL,
    event_id TEXT NOT NULL,
    direction TEXT NOT NULL,
    correspondence_ref TEXT NOT NULL,
    status TEXT NOT NULL,
    result_code TEXT,
    reply_code TEXT,
    source_event_id TEXT,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (owner_id, seq)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_ledger_owner_event ON ledger_events(owner_id, event_id);
CREATE INDEX IF NOT EXISTS idx_ledger_source ON ledger_events(source_event_id);

CREATE TABLE IF NOT EXISTS holds (
    revision_id TEXT NOT NULL REFERENCES revisions(id),
    seq INTEGER NOT NULL,
    flag INTEGER NOT NULL,
    reason TEXT NOT NULL,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    PRIMARY KEY (revision_id, seq)
);

CREATE TABLE IF NOT EXISTS transmittals (
    id TEXT PRIMARY KEY,
    vendor_ref TEXT NOT NULL,
    sender TEXT NOT NULL,
    receiver TEXT NOT NULL,
    correspondence_ref TEXT NOT NULL,
    canceled INTEGER NOT NULL DEFAULT 0,
    canceled_reason TEXT,
    canceled_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transmittals_vendor ON transmittals(vendor_ref);

CREATE TABLE IF NOT EXISTS transmittal_members (
    transmittal_id TEXT NOT NULL REFERENCES transmittals(id),
    revision_id TEXT NOT NULL REFERENCES revisions(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (transmittal_id, revision_id)
);

CREATE INDEX IF NOT EXISTS idx_members_revision ON transmittal_members(revision_id);

CREATE TABLE IF NOT EXISTS correspondence (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id),
    kind TEXT NOT NULL,
    correspondence_ref TEXT NOT NULL UNIQUE,
    send_date TEXT,
    target_reply_date TEXT,
    reply_received TEXT,
    canceled INTEGER NOT NULL DEFAULT 0,
    canceled_reason TEXT,
    canceled_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_correspondence_project ON correspondence(project_id, kind);

CREATE TABLE IF NOT EXISTS correspondence_links (
    correspondence_id TEXT NOT NULL REFERENCES correspondence(id),
    position INTEGER NOT NULL,
    target TEXT NOT NULL,
    PRIMARY KEY (correspondence_id, position)
);

CREATE TABLE IF NOT EXISTS sequences (
    project_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    value INTEGER NOT NULL,
    PRIMARY KEY (project_id, kind)
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

impl SqliteStore {
    /// Always applies the base schema (idempotent via IF NOT EXISTS).
    pub(crate) fn apply_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;

        // Bootstrap version if not set
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('version', '1')",
            [],
        )?;

        Ok(())
    }

    pub fn schema_version(&self) -> Result<u32> {
        let version_str: String = self
            .conn
            .query_row(
                "SELECT value FROM schema_meta WHERE key = 'version'",
                [],
                |row| row.get(0),
            )
            .unwrap_or_else(|_| "1".to_string());
        Ok(version_str.parse().unwrap_or(1))
    }
}
