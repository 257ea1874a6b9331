//! Receiving document batches: matching rows against the register and
//! attaching the resulting revisions to an index or a transmittal.
//!
//! A batch lands whole or not at all. Every row is checked before anything
//! is written, and a rejected batch reports all failing rows at once so the
//! sender can fix the file in one pass.

use std::collections::HashSet;

use docket_core::clock::{now_rfc3339, validate_timestamp};
use docket_core::codes::{DirectionCode, StatusCode};
use docket_core::entity::{DocumentIndex, DocumentRevision, Removal, Transmittal};
use docket_core::error::{Error, FailureReason, Result, RowFailure};
use docket_core::id::{DocumentIndexId, RevisionId, TransmittalId};
use docket_core::ledger::EventLedger;
use docket_store::{LedgerInsert, SqliteStore};
use serde::Deserialize;

use crate::advance::{event_for, AdvanceRequest};

/// One row of a received-documents file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedRow {
    pub document_number: String,
    pub document_title: String,
    pub revision_label: String,
}

/// Where a received batch is filed.
#[derive(Debug, Clone)]
pub enum AttachTarget {
    /// Straight onto the register, no transmittal involved.
    Index(DocumentIndexId),
    /// Onto an existing transmittal, as additional members.
    Transmittal(TransmittalId),
}

/// Parameters for registering a new transmittal from a received batch.
#[derive(Debug, Clone)]
pub struct NewTransmittal {
    pub vendor_ref: String,
    pub sender: String,
    pub receiver: String,
    pub correspondence_ref: String,
    pub occurred_at: Option<String>,
}

/// Matches a batch against the register and appends one revision per row.
/// Attaching to a transmittal also extends its member list; no ledger
/// events are written either way.
pub fn attach_revisions(
    store: &SqliteStore,
    target: &AttachTarget,
    rows: &[ReceivedRow],
) -> Result<Vec<RevisionId>> {
    match target {
        AttachTarget::Index(index_id) => {
            let index = store.get_index(index_id)?;
            let revisions = plan_revisions(store, &index, rows)?;
            let ids = revisions.iter().map(|r| r.id.clone()).collect();
            store.insert_revisions(&revisions)?;
            tracing::info!(index = %index_id, attached = revisions.len(), "received batch");
            Ok(ids)
        }
        AttachTarget::Transmittal(transmittal_id) => {
            let transmittal = store.get_transmittal(transmittal_id)?;
            let index = require_vendor_index(store, &transmittal.vendor_ref)?;
            let revisions = plan_revisions(store, &index, rows)?;
            let ids = revisions.iter().map(|r| r.id.clone()).collect();
            store.add_members(transmittal_id, &revisions)?;
            tracing::info!(transmittal = %transmittal_id, attached = revisions.len(),
                "received batch onto transmittal");
            Ok(ids)
        }
    }
}

/// Registers a transmittal from a received batch: the member revisions, the
/// transmittal record, and the opening received event, fanned out to every
/// member, all in one write.
pub fn create_transmittal(
    store: &SqliteStore,
    new: &NewTransmittal,
    rows: &[ReceivedRow],
) -> Result<Transmittal> {
    if new.correspondence_ref.trim().is_empty() {
        return Err(Error::validation("correspondence ref must not be empty"));
    }
    if rows.is_empty() {
        return Err(Error::validation("a transmittal needs at least one document"));
    }
    let index = require_vendor_index(store, &new.vendor_ref)?;
    let revisions = plan_revisions(store, &index, rows)?;
    let recorded_at = match &new.occurred_at {
        Some(at) => {
            validate_timestamp(at)?;
            at.clone()
        }
        None => now_rfc3339(),
    };

    let transmittal = Transmittal {
        id: TransmittalId::generate(),
        vendor_ref: new.vendor_ref.clone(),
        sender: new.sender.clone(),
        receiver: new.receiver.clone(),
        correspondence_ref: new.correspondence_ref.clone(),
        members: revisions.iter().map(|r| r.id.clone()).collect(),
        ledger: EventLedger::new(),
        canceled: Removal::none(),
        created_at: recorded_at.clone(),
    };

    let opening = AdvanceRequest {
        direction: DirectionCode::VendorToInternal,
        correspondence_ref: new.correspondence_ref.clone(),
        status: StatusCode::Received,
        result_code: None,
        reply_code: None,
        occurred_at: None,
    };
    let root = event_for(transmittal.id.as_str(), &opening, None, &recorded_at);
    let root_id = root.event_id.clone();
    let mut events: Vec<LedgerInsert> = vec![root];
    for revision in &revisions {
        events.push(event_for(
            revision.id.as_str(),
            &opening,
            Some(&root_id),
            &recorded_at,
        ));
    }

    store.create_transmittal(&transmittal, &revisions, &events)?;
    tracing::info!(id = %transmittal.id, correspondence_ref = %new.correspondence_ref,
        members = revisions.len(), "registered transmittal");
    store.get_transmittal(&transmittal.id)
}

fn require_vendor_index(store: &SqliteStore, vendor_ref: &str) -> Result<DocumentIndex> {
    store
        .find_vendor_index(vendor_ref)?
        .ok_or_else(|| Error::not_found("register for vendor", vendor_ref))
}

/// Validates every row against the register and builds the revision rows.
/// Any failure rejects the whole batch, listing each bad row.
fn plan_revisions(
    store: &SqliteStore,
    index: &DocumentIndex,
    rows: &[ReceivedRow],
) -> Result<Vec<DocumentRevision>> {
    let mut failures = Vec::new();
    let mut planned = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let created_at = now_rfc3339();

    for row in rows {
        let Some(entry) = store.find_entry(&index.id, &row.document_number)? else {
            failures.push(RowFailure {
                document_number: row.document_number.clone(),
                revision_label: Some(row.revision_label.clone()),
                reason: FailureReason::UnknownDocument,
            });
            continue;
        };
        let key = (row.document_number.clone(), row.revision_label.clone());
        let duplicate = seen.contains(&key)
            || store.chain_has_label(&entry.id, &row.revision_label)?;
        if duplicate {
            failures.push(RowFailure {
                document_number: row.document_number.clone(),
                revision_label: Some(row.revision_label.clone()),
                reason: FailureReason::DuplicateRevision,
            });
            continue;
        }
        seen.insert(key);
        planned.push(DocumentRevision {
            id: RevisionId::generate(),
            entry_id: entry.id,
            vendor_ref: index.vendor_ref.clone(),
            category_ref: entry.category_ref,
            revision_label: row.revision_label.clone(),
            ledger: EventLedger::new(),
            holds: Vec::new(),
            removed: Removal::none(),
            created_at: created_at.clone(),
        });
    }

    if !failures.is_empty() {
        return Err(Error::partial(failures));
    }
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{create_index, PlannedRow};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn planned(number: &str) -> PlannedRow {
        PlannedRow {
            document_number: number.into(),
            document_title: format!("Title {number}"),
            category_ref: Some("CAT-1".into()),
            target_date: None,
        }
    }

    fn received(number: &str, label: &str) -> ReceivedRow {
        ReceivedRow {
            document_number: number.into(),
            document_title: format!("Title {number}"),
            revision_label: label.into(),
        }
    }

    fn new_transmittal(reference: &str) -> NewTransmittal {
        NewTransmittal {
            vendor_ref: "VEN-01".into(),
            sender: "01".into(),
            receiver: "02".into(),
            correspondence_ref: reference.into(),
            occurred_at: None,
        }
    }

    #[test]
    fn create_transmittal_attaches_and_opens_ledgers() {
        let store = store();
        let index = create_index(&store, "VEN-01", &[planned("VP-001"), planned("VP-002")])
            .unwrap();

        let transmittal = create_transmittal(
            &store,
            &new_transmittal("01-02-T-001"),
            &[received("VP-001", "A"), received("VP-002", "A")],
        )
        .unwrap();

        assert_eq!(transmittal.members.len(), 2);
        assert_eq!(transmittal.ledger.len(), 1);
        let opening = transmittal.current_status().unwrap();
        assert_eq!(opening.status, "10");

        // Each member chain grew by one revision carrying the entry category.
        let chains = store.load_entry_chains(&index.id).unwrap();
        for row in &chains {
            assert_eq!(row.chain.len(), 1);
            assert_eq!(row.chain[0].category_ref.as_deref(), Some("CAT-1"));
            assert_eq!(row.chain[0].ledger.len(), 1);
        }
    }

    #[test]
    fn batch_rejection_lists_every_bad_row() {
        let store = store();
        create_index(&store, "VEN-01", &[planned("VP-001")]).unwrap();
        create_transmittal(&store, &new_transmittal("01-02-T-001"), &[received("VP-001", "A")])
            .unwrap();

        let err = create_transmittal(
            &store,
            &new_transmittal("01-02-T-002"),
            &[
                received("VP-001", "A"),
                received("VP-404", "A"),
                received("VP-001", "B"),
                received("VP-001", "B"),
            ],
        )
        .unwrap_err();

        let Error::PartialFailure { failures } = err else {
            panic!("expected a batch rejection");
        };
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].reason, FailureReason::DuplicateRevision);
        assert_eq!(failures[1].reason, FailureReason::UnknownDocument);
        assert_eq!(failures[1].document_number, "VP-404");
        // The repeated in-batch row is flagged, not silently dropped.
        assert_eq!(failures[2].reason, FailureReason::DuplicateRevision);

        // And the good row VP-001 rev B was not written.
        let index = store.find_vendor_index("VEN-01").unwrap().unwrap();
        let entry = store.find_entry(&index.id, "VP-001").unwrap().unwrap();
        assert!(!store.chain_has_label(&entry.id, "B").unwrap());
    }

    #[test]
    fn attach_to_index_writes_no_events() {
        let store = store();
        let index = create_index(&store, "VEN-01", &[planned("VP-001")]).unwrap();

        let ids = attach_revisions(
            &store,
            &AttachTarget::Index(index.id.clone()),
            &[received("VP-001", "A")],
        )
        .unwrap();
        assert_eq!(ids.len(), 1);

        let revision = store.get_revision(&ids[0]).unwrap();
        assert!(revision.ledger.is_empty());
        assert!(revision.current_status().is_none());
    }

    #[test]
    fn attach_to_transmittal_extends_members() {
        let store = store();
        create_index(
            &store,
            "VEN-01",
            &[planned("VP-001"), planned("VP-002"), planned("VP-003")],
        )
        .unwrap();
        let transmittal =
            create_transmittal(&store, &new_transmittal("01-02-T-001"), &[received("VP-001", "A")])
                .unwrap();

        let ids = attach_revisions(
            &store,
            &AttachTarget::Transmittal(transmittal.id.clone()),
            &[received("VP-002", "A"), received("VP-003", "A")],
        )
        .unwrap();

        let loaded = store.get_transmittal(&transmittal.id).unwrap();
        assert_eq!(loaded.members.len(), 3);
        assert_eq!(loaded.members[1], ids[0]);
        // Late members join quietly; the opening event is not replayed.
        let late = store.get_revision(&ids[0]).unwrap();
        assert!(late.ledger.is_empty());
    }

    #[test]
    fn vendor_without_register_is_rejected() {
        let store = store();
        let err = create_transmittal(&store, &new_transmittal("01-02-T-001"), &[received("VP-001", "A")])
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        create_index(&store, "VEN-01", &[planned("VP-001")]).unwrap();
        let err = create_transmittal(&store, &new_transmittal("01-02-T-001"), &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
