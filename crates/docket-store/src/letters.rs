//! Transmittals, correspondence, and the numbering sequences behind
//! correspondence refs.

use docket_core::entity::{Correspondence, DocumentRevision, Removal, Transmittal};
use docket_core::error::{Error, Result};
use docket_core::id::{CorrespondenceId, ProjectId, RevisionId, TransmittalId};
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::Serialize;

use crate::events::{insert_ledger_event, LedgerInsert};
use crate::registry::insert_revision;
use crate::{constraint_to_conflict, stored_id, SqliteStore};

/// Listing row for a transmittal.
#[derive(Debug, Clone, Serialize)]
pub struct TransmittalSummary {
    pub id: TransmittalId,
    pub vendor_ref: String,
    pub correspondence_ref: String,
    pub sender: String,
    pub receiver: String,
    pub member_count: u64,
    pub last_status: Option<String>,
    pub created_at: String,
}

impl SqliteStore {
    // ── Transmittals ────────────────────────────────────────────────

    /// Inserts a transmittal, its member revisions, and the opening ledger
    /// events in one transaction.
    pub fn create_transmittal(
        &self,
        transmittal: &Transmittal,
        revisions: &[DocumentRevision],
        events: &[LedgerInsert],
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO transmittals (id, vendor_ref, sender, receiver, correspondence_ref,
                                       canceled, canceled_reason, canceled_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                transmittal.id.as_str(),
                transmittal.vendor_ref,
                transmittal.sender,
                transmittal.receiver,
                transmittal.correspondence_ref,
                transmittal.canceled.flag,
                transmittal.canceled.reason,
                transmittal.canceled.at,
                transmittal.created_at,
            ],
        )?;
        for revision in revisions {
            insert_revision(&tx, revision)?;
        }
        for (offset, member) in transmittal.members.iter().enumerate() {
            tx.execute(
                "INSERT INTO transmittal_members (transmittal_id, revision_id, position)
                 VALUES (?1, ?2, ?3)",
                params![transmittal.id.as_str(), member.as_str(), offset as i64 + 1],
            )?;
        }
        for event in events {
            insert_ledger_event(&tx, event)?;
        }
        tx.commit()?;
        tracing::debug!(
            id = %transmittal.id,
            correspondence_ref = %transmittal.correspondence_ref,
            members = transmittal.members.len(),
            "created transmittal"
        );
        Ok(())
    }

    /// Attaches further revisions to an existing transmittal, at the tail of
    /// its member list. No ledger events are written; later status changes
    /// fan out to these members like any other.
    pub fn add_members(
        &self,
        transmittal_id: &TransmittalId,
        revisions: &[DocumentRevision],
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let base: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), 0) FROM transmittal_members
             WHERE transmittal_id = ?1",
            params![transmittal_id.as_str()],
            |row| row.get(0),
        )?;
        for (offset, revision) in revisions.iter().enumerate() {
            insert_revision(&tx, revision)?;
            tx.execute(
                "INSERT INTO transmittal_members (transmittal_id, revision_id, position)
                 VALUES (?1, ?2, ?3)",
                params![
                    transmittal_id.as_str(),
                    revision.id.as_str(),
                    base + offset as i64 + 1
                ],
            )?;
        }
        tx.commit()?;
        tracing::debug!(id = %transmittal_id, added = revisions.len(), "extended transmittal");
        Ok(())
    }

    /// Loads a transmittal with its full member list, canceled members
    /// included, and its ledger.
    pub fn get_transmittal(&self, id: &TransmittalId) -> Result<Transmittal> {
        let row = self
            .conn
            .query_row(
                "SELECT vendor_ref, sender, receiver, correspondence_ref,
                        canceled, canceled_reason, canceled_at, created_at
                 FROM transmittals WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(TransmittalRow {
                        vendor_ref: row.get(0)?,
                        sender: row.get(1)?,
                        receiver: row.get(2)?,
                        correspondence_ref: row.get(3)?,
                        canceled: Removal {
                            flag: row.get(4)?,
                            reason: row.get(5)?,
                            at: row.get(6)?,
                        },
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::not_found("transmittal", id))?;

        let mut stmt = self.conn.prepare(
            "SELECT revision_id FROM transmittal_members
             WHERE transmittal_id = ?1 ORDER BY position",
        )?;
        let raw = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        let members = raw
            .iter()
            .map(|r| stored_id(r))
            .collect::<Result<Vec<RevisionId>>>()?;

        Ok(Transmittal {
            id: id.clone(),
            vendor_ref: row.vendor_ref,
            sender: row.sender,
            receiver: row.receiver,
            correspondence_ref: row.correspondence_ref,
            members,
            ledger: self.load_ledger(id.as_str())?,
            canceled: row.canceled,
            created_at: row.created_at,
        })
    }

    /// Member revisions that are still active. Fan-out writes target these.
    pub fn active_member_ids(&self, id: &TransmittalId) -> Result<Vec<RevisionId>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.revision_id FROM transmittal_members m
             JOIN revisions r ON m.revision_id = r.id
             WHERE m.transmittal_id = ?1 AND r.removed = 0
             ORDER BY m.position",
        )?;
        let raw = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        raw.iter().map(|r| stored_id(r)).collect()
    }

    pub fn list_transmittals(
        &self,
        vendor_ref: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransmittalSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.vendor_ref, t.correspondence_ref, t.sender, t.receiver, t.created_at,
                    (SELECT COUNT(*) FROM transmittal_members m WHERE m.transmittal_id = t.id),
                    (SELECT e.status FROM ledger_events e WHERE e.owner_id = t.id
                     ORDER BY e.seq DESC LIMIT 1)
             FROM transmittals t
             WHERE t.canceled = 0 AND (?1 IS NULL OR t.vendor_ref = ?1)
             ORDER BY t.rowid
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
            .query_map(params![vendor_ref, limit, offset], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, u64>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(
                |(id, vendor_ref, correspondence_ref, sender, receiver, created_at, member_count, last_status)| {
                    Ok(TransmittalSummary {
                        id: stored_id(&id)?,
                        vendor_ref,
                        correspondence_ref,
                        sender,
                        receiver,
                        member_count,
                        last_status,
                        created_at,
                    })
                },
            )
            .collect()
    }

    pub fn count_transmittals(&self, vendor_ref: Option<&str>) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transmittals
             WHERE canceled = 0 AND (?1 IS NULL OR vendor_ref = ?1)",
            params![vendor_ref],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Marks the transmittal canceled and its active members removed with
    /// the same reason. Ledger history stays. Returns how many members were
    /// marked.
    pub fn cancel_transmittal_cascading(
        &self,
        id: &TransmittalId,
        reason: &str,
        at: &str,
    ) -> Result<u64> {
        let tx = self.conn.unchecked_transaction()?;
        let touched = tx.execute(
            "UPDATE transmittals SET canceled = 1, canceled_reason = ?2, canceled_at = ?3
             WHERE id = ?1",
            params![id.as_str(), reason, at],
        )?;
        if touched == 0 {
            return Err(Error::not_found("transmittal", id));
        }
        let members = tx.execute(
            "UPDATE revisions SET removed = 1, removed_reason = ?2, removed_at = ?3
             WHERE removed = 0 AND id IN
                   (SELECT revision_id FROM transmittal_members WHERE transmittal_id = ?1)",
            params![id.as_str(), reason, at],
        )?;
        tx.commit()?;
        tracing::debug!(id = %id, members, reason, "canceled transmittal");
        Ok(members as u64)
    }

    // ── Correspondence ──────────────────────────────────────────────

    /// Inserts a correspondence record and its link rows. A duplicate ref
    /// within the project surfaces as `Conflict`.
    pub fn insert_correspondence(&self, letter: &Correspondence) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO correspondence (id, project_id, kind, correspondence_ref, send_date,
                                         target_reply_date, reply_received, canceled,
                                         canceled_reason, canceled_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                letter.id.as_str(),
                letter.project_id.as_str(),
                letter.kind,
                letter.correspondence_ref,
                letter.send_date,
                letter.target_reply_date,
                letter.reply_received,
                letter.canceled.flag,
                letter.canceled.reason,
                letter.canceled.at,
                letter.created_at,
            ],
        )
        .map_err(|e| {
            constraint_to_conflict(
                e,
                format!(
                    "correspondence ref {} already issued",
                    letter.correspondence_ref
                ),
            )
        })?;
        for (offset, target) in letter.links.iter().enumerate() {
            tx.execute(
                "INSERT INTO correspondence_links (correspondence_id, position, target)
                 VALUES (?1, ?2, ?3)",
                params![letter.id.as_str(), offset as i64 + 1, target],
            )?;
        }
        tx.commit()?;
        tracing::debug!(id = %letter.id, correspondence_ref = %letter.correspondence_ref, "registered correspondence");
        Ok(())
    }

    pub fn get_correspondence(&self, id: &CorrespondenceId) -> Result<Correspondence> {
        let row = self
            .conn
            .query_row(
                "SELECT project_id, kind, correspondence_ref, send_date, target_reply_date,
                        reply_received, canceled, canceled_reason, canceled_at, created_at
                 FROM correspondence WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(CorrespondenceRow {
                        project_id: row.get(0)?,
                        kind: row.get(1)?,
                        correspondence_ref: row.get(2)?,
                        send_date: row.get(3)?,
                        target_reply_date: row.get(4)?,
                        reply_received: row.get(5)?,
                        canceled: Removal {
                            flag: row.get(6)?,
                            reason: row.get(7)?,
                            at: row.get(8)?,
                        },
                        created_at: row.get(9)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::not_found("correspondence", id))?;

        let mut stmt = self.conn.prepare(
            "SELECT target FROM correspondence_links
             WHERE correspondence_id = ?1 ORDER BY position",
        )?;
        let links = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(Correspondence {
            id: id.clone(),
            project_id: stored_id(&row.project_id)?,
            kind: row.kind,
            links,
            correspondence_ref: row.correspondence_ref,
            send_date: row.send_date,
            target_reply_date: row.target_reply_date,
            reply_received: row.reply_received,
            canceled: row.canceled,
            created_at: row.created_at,
        })
    }

    pub fn list_correspondence(
        &self,
        project_id: Option<&ProjectId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Correspondence>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM correspondence
             WHERE canceled = 0 AND (?1 IS NULL OR project_id = ?1)
             ORDER BY rowid
             LIMIT ?2 OFFSET ?3",
        )?;
        let ids = stmt
            .query_map(
                params![project_id.map(ProjectId::as_str), limit, offset],
                |row| row.get::<_, String>(0),
            )?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        ids.iter()
            .map(|raw| self.get_correspondence(&stored_id(raw)?))
            .collect()
    }

    pub fn count_correspondence(&self, project_id: Option<&ProjectId>) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM correspondence
             WHERE canceled = 0 AND (?1 IS NULL OR project_id = ?1)",
            params![project_id.map(ProjectId::as_str)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn set_reply_received(&self, id: &CorrespondenceId, date: &str) -> Result<()> {
        let touched = self.conn.execute(
            "UPDATE correspondence SET reply_received = ?2 WHERE id = ?1",
            params![id.as_str(), date],
        )?;
        if touched == 0 {
            return Err(Error::not_found("correspondence", id));
        }
        tracing::debug!(id = %id, date, "recorded reply");
        Ok(())
    }

    pub fn cancel_correspondence(&self, id: &CorrespondenceId, reason: &str, at: &str) -> Result<()> {
        let touched = self.conn.execute(
            "UPDATE correspondence SET canceled = 1, canceled_reason = ?2, canceled_at = ?3
             WHERE id = ?1",
            params![id.as_str(), reason, at],
        )?;
        if touched == 0 {
            return Err(Error::not_found("correspondence", id));
        }
        tracing::debug!(id = %id, reason, "canceled correspondence");
        Ok(())
    }

    /// Active letters whose reply is overdue as of `today`, oldest target
    /// date first.
    pub fn outstanding_replies(
        &self,
        project_id: &ProjectId,
        today: &str,
    ) -> Result<Vec<Correspondence>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM correspondence
             WHERE project_id = ?1 AND canceled = 0 AND reply_received IS NULL
               AND target_reply_date IS NOT NULL AND target_reply_date < ?2
             ORDER BY target_reply_date",
        )?;
        let ids = stmt
            .query_map(params![project_id.as_str(), today], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        ids.iter()
            .map(|raw| self.get_correspondence(&stored_id(raw)?))
            .collect()
    }

    // ── Sequences ───────────────────────────────────────────────────

    /// Issues the next sequence number for a project and kind tag. The
    /// counter row stores the last issued value; when absent it is seeded
    /// from the highest trailing number among existing refs of that kind,
    /// so adopting the service mid-project cannot re-issue a ref. Runs as
    /// an immediate transaction so two issuers cannot read the same value.
    pub fn next_sequence(&self, project_id: &ProjectId, kind: &str) -> Result<u64> {
        let tx =
            rusqlite::Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let current: Option<u64> = tx
            .query_row(
                "SELECT value FROM sequences WHERE project_id = ?1 AND kind = ?2",
                params![project_id.as_str(), kind],
                |row| row.get(0),
            )
            .optional()?;
        let last = match current {
            Some(value) => value,
            None => seed_sequence(&tx, project_id, kind)?,
        };
        let next = last + 1;
        tx.execute(
            "INSERT OR REPLACE INTO sequences (project_id, kind, value) VALUES (?1, ?2, ?3)",
            params![project_id.as_str(), kind, next],
        )?;
        tx.commit()?;
        Ok(next)
    }
}

struct TransmittalRow {
    vendor_ref: String,
    sender: String,
    receiver: String,
    correspondence_ref: String,
    canceled: Removal,
    created_at: String,
}

struct CorrespondenceRow {
    project_id: String,
    kind: String,
    correspondence_ref: String,
    send_date: Option<String>,
    target_reply_date: Option<String>,
    reply_received: Option<String>,
    canceled: Removal,
    created_at: String,
}

fn seed_sequence(
    tx: &rusqlite::Transaction<'_>,
    project_id: &ProjectId,
    kind: &str,
) -> Result<u64> {
    let mut stmt = tx.prepare(
        "SELECT correspondence_ref FROM correspondence WHERE project_id = ?1 AND kind = ?2",
    )?;
    let refs = stmt
        .query_map(params![project_id.as_str(), kind], |row| {
            row.get::<_, String>(0)
        })?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    let last = refs
        .iter()
        .filter_map(|r| r.rsplit('-').next())
        .filter_map(|tail| tail.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    Ok(last)
}
