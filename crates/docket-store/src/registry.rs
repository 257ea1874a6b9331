//! Projects, document indexes, register entries, and revision rows.
//!
//! Child lists follow the report scope: `DocumentIndex::entries` carries
//! active entries only, while revision chains always carry every revision,
//! removed ones included, because chain resolution reads the latest revision
//! regardless of its removal marker.

use docket_core::entity::{DocumentEntry, DocumentIndex, DocumentRevision, Project, Removal};
use docket_core::error::{Error, Result};
use docket_core::id::{DocumentIndexId, EntryId, ProjectId, RevisionId};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::{constraint_to_conflict, stored_id, SqliteStore};

/// Mutable-field update for one existing entry. Applying it also clears a
/// prior removal mark.
#[derive(Debug, Clone)]
pub struct EntryUpdate {
    pub id: EntryId,
    pub document_title: String,
    pub category_ref: Option<String>,
    pub target_date: Option<String>,
}

/// One register entry together with its full revision chain, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithChain {
    pub entry: DocumentEntry,
    pub chain: Vec<DocumentRevision>,
}

/// Listing row for a document index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub id: DocumentIndexId,
    pub vendor_ref: String,
    pub entry_count: u64,
    pub created_at: String,
}

impl SqliteStore {
    // ── Projects ────────────────────────────────────────────────────

    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.conn.execute(
            "INSERT INTO projects (id, name, client_code, contractor_code, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id.as_str(),
                project.name,
                project.client_code,
                project.contractor_code,
                project.created_at,
            ],
        )?;
        tracing::debug!(id = %project.id, name = %project.name, "created project");
        Ok(())
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<Project> {
        self.conn
            .query_row(
                "SELECT name, client_code, contractor_code, created_at
                 FROM projects WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Project {
                        id: id.clone(),
                        name: row.get(0)?,
                        client_code: row.get(1)?,
                        contractor_code: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::not_found("project", id))
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, client_code, contractor_code, created_at
             FROM projects ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, name, client_code, contractor_code, created_at)| {
                Ok(Project {
                    id: stored_id(&id)?,
                    name,
                    client_code,
                    contractor_code,
                    created_at,
                })
            })
            .collect()
    }

    // ── Indexes ─────────────────────────────────────────────────────

    /// Inserts an index and its initial entries in one transaction.
    pub fn create_index(&self, index: &DocumentIndex, entries: &[DocumentEntry]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO doc_indexes (id, vendor_ref, removed, removed_reason, removed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                index.id.as_str(),
                index.vendor_ref,
                index.removed.flag,
                index.removed.reason,
                index.removed.at,
                index.created_at,
            ],
        )?;
        for (offset, entry) in entries.iter().enumerate() {
            insert_entry(&tx, entry, offset as i64 + 1)?;
        }
        tx.commit()?;
        tracing::debug!(id = %index.id, entries = entries.len(), "created document index");
        Ok(())
    }

    /// Appends entries after the index's current highest position.
    pub fn append_entries(
        &self,
        index_id: &DocumentIndexId,
        entries: &[DocumentEntry],
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let base: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), 0) FROM entries WHERE index_id = ?1",
            params![index_id.as_str()],
            |row| row.get(0),
        )?;
        for (offset, entry) in entries.iter().enumerate() {
            insert_entry(&tx, entry, base + offset as i64 + 1)?;
        }
        tx.commit()?;
        tracing::debug!(index = %index_id, entries = entries.len(), "imported entries");
        Ok(())
    }

    pub fn get_index(&self, id: &DocumentIndexId) -> Result<DocumentIndex> {
        let (vendor_ref, removed, created_at) = self
            .conn
            .query_row(
                "SELECT vendor_ref, removed, removed_reason, removed_at, created_at
                 FROM doc_indexes WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        Removal {
                            flag: row.get(1)?,
                            reason: row.get(2)?,
                            at: row.get(3)?,
                        },
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?
            .ok_or_else(|| Error::not_found("index", id))?;

        let mut stmt = self.conn.prepare(
            "SELECT id FROM entries WHERE index_id = ?1 AND removed = 0 ORDER BY position",
        )?;
        let ids = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let entries = ids
            .iter()
            .map(|raw| stored_id(raw))
            .collect::<Result<Vec<EntryId>>>()?;

        Ok(DocumentIndex {
            id: id.clone(),
            vendor_ref,
            entries,
            removed,
            created_at,
        })
    }

    /// The vendor's most recent non-removed index, if any.
    pub fn find_vendor_index(&self, vendor_ref: &str) -> Result<Option<DocumentIndex>> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM doc_indexes
                 WHERE vendor_ref = ?1 AND removed = 0
                 ORDER BY rowid DESC LIMIT 1",
                params![vendor_ref],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(raw) => self.get_index(&stored_id(&raw)?).map(Some),
            None => Ok(None),
        }
    }

    pub fn list_indexes(&self, limit: i64, offset: i64) -> Result<Vec<IndexSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.id, i.vendor_ref, i.created_at,
                    (SELECT COUNT(*) FROM entries e
                     WHERE e.index_id = i.id AND e.removed = 0)
             FROM doc_indexes i
             WHERE i.removed = 0
             ORDER BY i.rowid
             LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map(params![limit, offset], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, vendor_ref, created_at, entry_count)| {
                Ok(IndexSummary {
                    id: stored_id(&id)?,
                    vendor_ref,
                    entry_count,
                    created_at,
                })
            })
            .collect()
    }

    pub fn count_indexes(&self) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM doc_indexes WHERE removed = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Marks the index, its entries, and their revisions removed in one
    /// transaction. Ledger history is untouched.
    pub fn remove_index_cascading(
        &self,
        id: &DocumentIndexId,
        reason: &str,
        at: &str,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let touched = tx.execute(
            "UPDATE doc_indexes SET removed = 1, removed_reason = ?2, removed_at = ?3
             WHERE id = ?1",
            params![id.as_str(), reason, at],
        )?;
        if touched == 0 {
            return Err(Error::not_found("index", id));
        }
        tx.execute(
            "UPDATE revisions SET removed = 1, removed_reason = ?2, removed_at = ?3
             WHERE removed = 0 AND entry_id IN (SELECT id FROM entries WHERE index_id = ?1)",
            params![id.as_str(), reason, at],
        )?;
        tx.execute(
            "UPDATE entries SET removed = 1, removed_reason = ?2, removed_at = ?3
             WHERE index_id = ?1 AND removed = 0",
            params![id.as_str(), reason, at],
        )?;
        tx.commit()?;
        tracing::debug!(index = %id, reason, "removed index");
        Ok(())
    }

    // ── Entries ─────────────────────────────────────────────────────

    pub fn get_entry(&self, id: &EntryId) -> Result<DocumentEntry> {
        let row = self
            .conn
            .query_row(
                "SELECT index_id, document_number, document_title, category_ref, target_date,
                        removed, removed_reason, removed_at, created_at
                 FROM entries WHERE id = ?1",
                params![id.as_str()],
                map_entry_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("entry", id))?;
        self.entry_from_row(id.clone(), row)
    }

    /// Active entry matching a document number, register order.
    pub fn find_entry(
        &self,
        index_id: &DocumentIndexId,
        document_number: &str,
    ) -> Result<Option<DocumentEntry>> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM entries
                 WHERE index_id = ?1 AND document_number = ?2 AND removed = 0
                 ORDER BY position LIMIT 1",
                params![index_id.as_str(), document_number],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(raw) => self.get_entry(&stored_id(&raw)?).map(Some),
            None => Ok(None),
        }
    }

    /// Whether any revision row, removed or not, carries this label. Backs
    /// the duplicate guard; the UNIQUE constraint is the race-proof net.
    pub fn chain_has_label(&self, entry_id: &EntryId, label: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM revisions WHERE entry_id = ?1 AND revision_label = ?2)",
            params![entry_id.as_str(), label],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Applies an edit batch: field updates (clearing removal marks), fresh
    /// entries, and removals, all in one transaction.
    pub fn apply_entry_edits(
        &self,
        index_id: &DocumentIndexId,
        updates: &[EntryUpdate],
        creates: &[DocumentEntry],
        removes: &[(EntryId, String)],
        at: &str,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for update in updates {
            let touched = tx.execute(
                "UPDATE entries SET document_title = ?3, category_ref = ?4, target_date = ?5,
                        removed = 0, removed_reason = NULL, removed_at = NULL
                 WHERE id = ?1 AND index_id = ?2",
                params![
                    update.id.as_str(),
                    index_id.as_str(),
                    update.document_title,
                    update.category_ref,
                    update.target_date,
                ],
            )?;
            if touched == 0 {
                return Err(Error::not_found("entry", &update.id));
            }
        }
        let base: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), 0) FROM entries WHERE index_id = ?1",
            params![index_id.as_str()],
            |row| row.get(0),
        )?;
        for (offset, entry) in creates.iter().enumerate() {
            insert_entry(&tx, entry, base + offset as i64 + 1)?;
        }
        for (id, reason) in removes {
            let touched = tx.execute(
                "UPDATE entries SET removed = 1, removed_reason = ?3, removed_at = ?4
                 WHERE id = ?1 AND index_id = ?2",
                params![id.as_str(), index_id.as_str(), reason, at],
            )?;
            if touched == 0 {
                return Err(Error::not_found("entry", id));
            }
        }
        tx.commit()?;
        tracing::debug!(
            index = %index_id,
            updated = updates.len(),
            created = creates.len(),
            removed = removes.len(),
            "edited entries"
        );
        Ok(())
    }

    // ── Revisions ───────────────────────────────────────────────────

    /// Inserts revision rows at the tail of their entries' chains, one
    /// transaction. Duplicate labels surface as `Conflict`.
    pub fn insert_revisions(&self, revisions: &[DocumentRevision]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for revision in revisions {
            insert_revision(&tx, revision)?;
        }
        tx.commit()?;
        tracing::debug!(count = revisions.len(), "attached revisions");
        Ok(())
    }

    pub fn mark_revision_removed(&self, id: &RevisionId, reason: &str, at: &str) -> Result<()> {
        let touched = self.conn.execute(
            "UPDATE revisions SET removed = 1, removed_reason = ?2, removed_at = ?3
             WHERE id = ?1",
            params![id.as_str(), reason, at],
        )?;
        if touched == 0 {
            return Err(Error::not_found("revision", id));
        }
        tracing::debug!(revision = %id, reason, "removed revision");
        Ok(())
    }

    // ── Chain loading ───────────────────────────────────────────────

    /// All of an index's active entries with their chains.
    pub fn load_entry_chains(&self, index_id: &DocumentIndexId) -> Result<Vec<EntryWithChain>> {
        self.load_entry_chains_page(index_id, -1, 0)
    }

    /// One page of an index's active entries with their chains. A negative
    /// limit means no limit.
    pub fn load_entry_chains_page(
        &self,
        index_id: &DocumentIndexId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EntryWithChain>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, index_id, document_number, document_title, category_ref, target_date,
                    removed, removed_reason, removed_at, created_at
             FROM entries
             WHERE index_id = ?1 AND removed = 0
             ORDER BY position
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
            .query_map(params![index_id.as_str(), limit, offset], |row| {
                Ok((row.get::<_, String>(0)?, map_entry_row_offset(row, 1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.rows_to_chains(rows)
    }

    pub fn count_active_entries(&self, index_id: &DocumentIndexId) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE index_id = ?1 AND removed = 0",
            params![index_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// One page of active entries across all the vendor's active indexes,
    /// creation order.
    pub fn load_vendor_chains_page(
        &self,
        vendor_ref: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EntryWithChain>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.index_id, e.document_number, e.document_title, e.category_ref,
                    e.target_date, e.removed, e.removed_reason, e.removed_at, e.created_at
             FROM entries e
             JOIN doc_indexes i ON e.index_id = i.id
             WHERE i.vendor_ref = ?1 AND i.removed = 0 AND e.removed = 0
             ORDER BY e.rowid
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
            .query_map(params![vendor_ref, limit, offset], |row| {
                Ok((row.get::<_, String>(0)?, map_entry_row_offset(row, 1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.rows_to_chains(rows)
    }

    pub fn count_vendor_entries(&self, vendor_ref: &str) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries e
             JOIN doc_indexes i ON e.index_id = i.id
             WHERE i.vendor_ref = ?1 AND i.removed = 0 AND e.removed = 0",
            [vendor_ref],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn rows_to_chains(&self, rows: Vec<(String, EntryRow)>) -> Result<Vec<EntryWithChain>> {
        let mut out = Vec::with_capacity(rows.len());
        for (raw_id, row) in rows {
            let id: EntryId = stored_id(&raw_id)?;
            let entry = self.entry_from_row(id.clone(), row)?;
            let chain = self.load_chain(&id)?;
            out.push(EntryWithChain { entry, chain });
        }
        Ok(out)
    }

    /// Every revision of an entry, removed included, oldest first.
    pub fn load_chain(&self, entry_id: &EntryId) -> Result<Vec<DocumentRevision>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM revisions WHERE entry_id = ?1 ORDER BY position",
        )?;
        let ids = stmt
            .query_map(params![entry_id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        ids.iter()
            .map(|raw| self.get_revision(&stored_id(raw)?))
            .collect()
    }

    fn entry_from_row(&self, id: EntryId, row: EntryRow) -> Result<DocumentEntry> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM revisions WHERE entry_id = ?1 ORDER BY position",
        )?;
        let ids = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        let revisions = ids
            .iter()
            .map(|raw| stored_id(raw))
            .collect::<Result<Vec<RevisionId>>>()?;

        Ok(DocumentEntry {
            id,
            index_id: stored_id(&row.index_id)?,
            document_number: row.document_number,
            document_title: row.document_title,
            category_ref: row.category_ref,
            target_date: row.target_date,
            revisions,
            removed: row.removed,
            created_at: row.created_at,
        })
    }
}

struct EntryRow {
    index_id: String,
    document_number: String,
    document_title: String,
    category_ref: Option<String>,
    target_date: Option<String>,
    removed: Removal,
    created_at: String,
}

fn map_entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
    map_entry_row_offset(row, 0)
}

fn map_entry_row_offset(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        index_id: row.get(base)?,
        document_number: row.get(base + 1)?,
        document_title: row.get(base + 2)?,
        category_ref: row.get(base + 3)?,
        target_date: row.get(base + 4)?,
        removed: Removal {
            flag: row.get(base + 5)?,
            reason: row.get(base + 6)?,
            at: row.get(base + 7)?,
        },
        created_at: row.get(base + 8)?,
    })
}

pub(crate) fn insert_entry(
    conn: &Connection,
    entry: &DocumentEntry,
    position: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO entries (id, index_id, position, document_number, document_title,
                              category_ref, target_date, removed, removed_reason, removed_at,
                              created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            entry.id.as_str(),
            entry.index_id.as_str(),
            position,
            entry.document_number,
            entry.document_title,
            entry.category_ref,
            entry.target_date,
            entry.removed.flag,
            entry.removed.reason,
            entry.removed.at,
            entry.created_at,
        ],
    )?;
    Ok(())
}

/// Chain position is assigned here, inside the caller's transaction.
pub(crate) fn insert_revision(conn: &Connection, revision: &DocumentRevision) -> Result<()> {
    conn.execute(
        "INSERT INTO revisions (id, entry_id, position, vendor_ref, category_ref,
                                revision_label, removed, removed_reason, removed_at, created_at)
         VALUES (?1, ?2,
                 (SELECT COALESCE(MAX(position), 0) + 1 FROM revisions WHERE entry_id = ?2),
                 ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            revision.id.as_str(),
            revision.entry_id.as_str(),
            revision.vendor_ref,
            revision.category_ref,
            revision.revision_label,
            revision.removed.flag,
            revision.removed.reason,
            revision.removed.at,
            revision.created_at,
        ],
    )
    .map_err(|e| {
        constraint_to_conflict(
            e,
            format!(
                "revision label {} already exists on entry {}",
                revision.revision_label, revision.entry_id
            ),
        )
    })?;
    Ok(())
}
