//! Append-only ledger events and hold periods.
//!
//! Each exchange is one row carrying both halves: the movement columns
//! (direction, correspondence ref) and the state columns (status, optional
//! result and reply codes). Storing them in one row is what keeps the two
//! ledgers in lockstep; there is no way to persist a movement without its
//! state. Rows are never updated. The only deletion path is retraction,
//! which drops the row and every fan-out copy that points back at it.

use docket_core::entity::{DocumentRevision, HoldPeriod, Removal};
use docket_core::error::{Error, Result};
use docket_core::id::{EventId, RevisionId};
use docket_core::ledger::{EventLedger, StatusEvent, TransmittalEvent};
use rusqlite::{params, Connection, OptionalExtension};

use crate::{stored_id, SqliteStore};

/// One exchange ready for insertion. The owner is either a revision id or a
/// transmittal id; both ledgers live in the same table.
#[derive(Debug, Clone)]
pub struct LedgerInsert {
    pub owner: String,
    pub event_id: EventId,
    pub direction: String,
    pub correspondence_ref: String,
    pub status: String,
    pub result_code: Option<String>,
    pub reply_code: Option<String>,
    pub source_event_id: Option<EventId>,
    pub recorded_at: String,
}

/// Outcome of a retraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retraction {
    /// The row and its fan-out copies are gone.
    Removed,
    /// The event is the owner's first; retraction is a no-op.
    FirstEventKept,
    /// No such event on this owner.
    Missing,
}

impl SqliteStore {
    /// Appends exchanges in one transaction, assigning each owner's next
    /// sequence number at insert time.
    pub fn append_events(&self, inserts: &[LedgerInsert]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for insert in inserts {
            insert_ledger_event(&tx, insert)?;
        }
        tx.commit()?;
        tracing::debug!(count = inserts.len(), "appended ledger events");
        Ok(())
    }

    /// Deletes one event and its fan-out copies. With `keep_first` the
    /// owner's opening event is spared and the call reports
    /// [`Retraction::FirstEventKept`]; transmittal ledgers use this so a
    /// transmittal with members always keeps its received event. Revision
    /// ledgers retract freely down to empty ("not yet transmitted" is a
    /// valid state).
    pub fn retract_event(
        &self,
        owner: &str,
        event_id: &EventId,
        keep_first: bool,
    ) -> Result<Retraction> {
        let tx = self.conn.unchecked_transaction()?;
        let seq: Option<i64> = tx
            .query_row(
                "SELECT seq FROM ledger_events WHERE owner_id = ?1 AND event_id = ?2",
                params![owner, event_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(seq) = seq else {
            return Ok(Retraction::Missing);
        };
        if keep_first {
            let first: i64 = tx.query_row(
                "SELECT MIN(seq) FROM ledger_events WHERE owner_id = ?1",
                params![owner],
                |row| row.get(0),
            )?;
            if seq == first {
                return Ok(Retraction::FirstEventKept);
            }
        }
        tx.execute(
            "DELETE FROM ledger_events WHERE owner_id = ?1 AND seq = ?2",
            params![owner, seq],
        )?;
        let copies = tx.execute(
            "DELETE FROM ledger_events WHERE source_event_id = ?1",
            params![event_id.as_str()],
        )?;
        tx.commit()?;
        tracing::debug!(owner, event = %event_id, copies, "retracted event");
        Ok(Retraction::Removed)
    }

    /// Records a hold change. Opening a new hold closes any still-open one
    /// first, so at most one hold period is open per revision. Release rows
    /// are stored already closed (`ended_at = started_at`), a zero-length
    /// period marking the release itself; only `flag = 1` rows can be open.
    pub fn append_hold(
        &self,
        revision_id: &RevisionId,
        flag: bool,
        reason: &str,
        at: &str,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        if flag {
            tx.execute(
                "UPDATE holds SET ended_at = ?2
                 WHERE revision_id = ?1 AND flag = 1 AND ended_at IS NULL",
                params![revision_id.as_str(), at],
            )?;
            tx.execute(
                "INSERT INTO holds (revision_id, seq, flag, reason, started_at, ended_at)
                 VALUES (?1,
                         (SELECT COALESCE(MAX(seq), 0) + 1 FROM holds WHERE revision_id = ?1),
                         1, ?2, ?3, NULL)",
                params![revision_id.as_str(), reason, at],
            )?;
        } else {
            tx.execute(
                "UPDATE holds SET ended_at = ?2
                 WHERE revision_id = ?1 AND flag = 1 AND ended_at IS NULL",
                params![revision_id.as_str(), at],
            )?;
            tx.execute(
                "INSERT INTO holds (revision_id, seq, flag, reason, started_at, ended_at)
                 VALUES (?1,
                         (SELECT COALESCE(MAX(seq), 0) + 1 FROM holds WHERE revision_id = ?1),
                         0, ?2, ?3, ?3)",
                params![revision_id.as_str(), reason, at],
            )?;
        }
        tx.commit()?;
        tracing::debug!(revision = %revision_id, flag, "recorded hold change");
        Ok(())
    }

    /// Loads a revision with its ledger and hold history.
    pub fn get_revision(&self, id: &RevisionId) -> Result<DocumentRevision> {
        let row = self
            .conn
            .query_row(
                "SELECT entry_id, vendor_ref, category_ref, revision_label,
                        removed, removed_reason, removed_at, created_at
                 FROM revisions WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(RevisionRow {
                        entry_id: row.get(0)?,
                        vendor_ref: row.get(1)?,
                        category_ref: row.get(2)?,
                        revision_label: row.get(3)?,
                        removed: Removal {
                            flag: row.get(4)?,
                            reason: row.get(5)?,
                            at: row.get(6)?,
                        },
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::not_found("revision", id))?;

        Ok(DocumentRevision {
            id: id.clone(),
            entry_id: stored_id(&row.entry_id)?,
            vendor_ref: row.vendor_ref,
            category_ref: row.category_ref,
            revision_label: row.revision_label,
            ledger: self.load_ledger(id.as_str())?,
            holds: self.load_holds(id)?,
            removed: row.removed,
            created_at: row.created_at,
        })
    }

    /// Rebuilds an owner's paired ledger in sequence order. Both halves of
    /// each pair come from the same row, so the pairing invariant holds by
    /// construction.
    pub(crate) fn load_ledger(&self, owner: &str) -> Result<EventLedger> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, direction, correspondence_ref, status, result_code, reply_code,
                    recorded_at
             FROM ledger_events WHERE owner_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok(LedgerEventRow {
                    event_id: row.get(0)?,
                    direction: row.get(1)?,
                    correspondence_ref: row.get(2)?,
                    status: row.get(3)?,
                    result_code: row.get(4)?,
                    reply_code: row.get(5)?,
                    recorded_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut movements = Vec::with_capacity(rows.len());
        let mut states = Vec::with_capacity(rows.len());
        for row in rows {
            let event_id: EventId = stored_id(&row.event_id)?;
            movements.push(TransmittalEvent {
                event_id: event_id.clone(),
                direction: row.direction,
                correspondence_ref: row.correspondence_ref,
                recorded_at: row.recorded_at.clone(),
            });
            states.push(StatusEvent {
                event_id,
                status: row.status,
                result_code: row.result_code,
                reply_code: row.reply_code,
                recorded_at: row.recorded_at,
            });
        }
        EventLedger::from_parts(movements, states)
    }

    fn load_holds(&self, revision_id: &RevisionId) -> Result<Vec<HoldPeriod>> {
        let mut stmt = self.conn.prepare(
            "SELECT flag, reason, started_at, ended_at
             FROM holds WHERE revision_id = ?1 ORDER BY seq",
        )?;
        let holds = stmt
            .query_map(params![revision_id.as_str()], |row| {
                Ok(HoldPeriod {
                    flag: row.get(0)?,
                    reason: row.get(1)?,
                    started_at: row.get(2)?,
                    ended_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(holds)
    }
}

struct RevisionRow {
    entry_id: String,
    vendor_ref: String,
    category_ref: Option<String>,
    revision_label: String,
    removed: Removal,
    created_at: String,
}

struct LedgerEventRow {
    event_id: String,
    direction: String,
    correspondence_ref: String,
    status: String,
    result_code: Option<String>,
    reply_code: Option<String>,
    recorded_at: String,
}

pub(crate) fn insert_ledger_event(conn: &Connection, insert: &LedgerInsert) -> Result<()> {
    conn.execute(
        "INSERT INTO ledger_events (owner_id, seq, event_id, direction, correspondence_ref,
                                    status, result_code, reply_code, source_event_id, recorded_at)
         VALUES (?1,
                 (SELECT COALESCE(MAX(seq), 0) + 1 FROM ledger_events WHERE owner_id = ?1),
                 ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            insert.owner,
            insert.event_id.as_str(),
            insert.direction,
            insert.correspondence_ref,
            insert.status,
            insert.result_code,
            insert.reply_code,
            insert.source_event_id.as_ref().map(|id| id.as_str()),
            insert.recorded_at,
        ],
    )?;
    Ok(())
}
