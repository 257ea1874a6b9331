//! Headline numbers and the current-status breakdown for one register.

use docket_core::clock::today;
use docket_core::codes;
use docket_core::error::Result;
use docket_core::id::DocumentIndexId;
use docket_store::{EntryWithChain, SqliteStore};
use serde::Serialize;

use crate::resolve;

/// Rollup counts for a register. The revision totals count every submission;
/// the deleted, held, and delayed flags are judged per entry from its latest
/// revision only.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub entry_count: u64,
    pub revisions_received: u64,
    pub first_submission_count: u64,
    pub deleted_count: u64,
    pub held_count: u64,
    pub delayed_count: u64,
}

/// One current-status bucket. Buckets appear in the order their status was
/// first seen while walking the register.
#[derive(Debug, Clone, Serialize)]
pub struct StatusBucket {
    pub status_code: String,
    pub status_label: String,
    pub count: u64,
}

pub fn overview(store: &SqliteStore, index_id: &DocumentIndexId) -> Result<Overview> {
    overview_on(store, index_id, &today())
}

/// Overview with an explicit reference date for the delayed count.
pub fn overview_on(
    store: &SqliteStore,
    index_id: &DocumentIndexId,
    today: &str,
) -> Result<Overview> {
    store.get_index(index_id)?;
    let rows = store.load_entry_chains(index_id)?;

    let mut report = Overview {
        entry_count: rows.len() as u64,
        revisions_received: 0,
        first_submission_count: 0,
        deleted_count: 0,
        held_count: 0,
        delayed_count: 0,
    };
    for row in &rows {
        report.revisions_received += row.chain.len() as u64;
        report.first_submission_count += row
            .chain
            .iter()
            .filter(|r| r.is_initial_submission())
            .count() as u64;
        if let Some(latest) = resolve::latest_revision(&row.chain) {
            if latest.removed.is_removed() {
                report.deleted_count += 1;
            }
            if latest.is_held() {
                report.held_count += 1;
            }
        }
        if is_delayed(row, today) {
            report.delayed_count += 1;
        }
    }
    Ok(report)
}

/// Current-status buckets across all active entries of the register.
/// Entries that were never transmitted land in the `00` sentinel bucket.
pub fn status_breakdown(
    store: &SqliteStore,
    index_id: &DocumentIndexId,
) -> Result<Vec<StatusBucket>> {
    store.get_index(index_id)?;
    let rows = store.load_entry_chains(index_id)?;

    let mut buckets: Vec<StatusBucket> = Vec::new();
    for row in &rows {
        let code = resolve::current_status_code(&row.chain);
        match buckets.iter_mut().find(|b| b.status_code == code) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(StatusBucket {
                status_code: code.to_string(),
                status_label: codes::status_label_for(code),
                count: 1,
            }),
        }
    }
    Ok(buckets)
}

/// An entry is delayed once its target date has passed without the client
/// having reviewed the latest submission.
fn is_delayed(row: &EntryWithChain, today: &str) -> bool {
    let Some(target) = row.entry.target_date.as_deref() else {
        return false;
    };
    target < today && resolve::current_status_code(&row.chain) != "21"
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::codes::{DirectionCode, ResultCode, StatusCode};
    use docket_flow::{
        advance, create_index, create_transmittal, hold_revision, remove_revision,
        AdvanceRequest, LedgerTarget, NewTransmittal, PlannedRow, ReceivedRow,
    };

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn planned(number: &str, target: Option<&str>) -> PlannedRow {
        PlannedRow {
            document_number: number.into(),
            document_title: format!("Title {number}"),
            category_ref: None,
            target_date: target.map(Into::into),
        }
    }

    fn received(number: &str, label: &str) -> ReceivedRow {
        ReceivedRow {
            document_number: number.into(),
            document_title: format!("Title {number}"),
            revision_label: label.into(),
        }
    }

    fn transmit(store: &SqliteStore, reference: &str, rows: &[ReceivedRow]) -> docket_core::entity::Transmittal {
        create_transmittal(
            store,
            &NewTransmittal {
                vendor_ref: "VEN-01".into(),
                sender: "01".into(),
                receiver: "02".into(),
                correspondence_ref: reference.into(),
                occurred_at: None,
            },
            rows,
        )
        .unwrap()
    }

    #[test]
    fn empty_register_overview() {
        let store = store();
        let index = create_index(&store, "VEN-01", &[planned("VP-001", None)]).unwrap();

        let report = overview(&store, &index.id).unwrap();
        assert_eq!(report.entry_count, 1);
        assert_eq!(report.revisions_received, 0);
        assert_eq!(report.first_submission_count, 0);

        let buckets = status_breakdown(&store, &index.id).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].status_code, "00");
        assert_eq!(buckets[0].status_label, "Not Received");
        assert_eq!(buckets[0].count, 1);
    }

    #[test]
    fn overview_counts_by_latest_revision() {
        let store = store();
        let index = create_index(
            &store,
            "VEN-01",
            &[
                planned("VP-001", Some("2026-08-01")),
                planned("VP-002", Some("2026-12-01")),
                planned("VP-003", None),
            ],
        )
        .unwrap();
        let first = transmit(
            &store,
            "01-02-T-001",
            &[received("VP-001", "A"), received("VP-002", "A")],
        );
        // VP-001 resubmits; only rev B counts for the entry flags now.
        let second = transmit(&store, "01-02-T-002", &[received("VP-001", "B")]);
        hold_revision(&store, &second.members[0], true, "awaiting client").unwrap();
        // A hold left open on the superseded rev A must not count.
        hold_revision(&store, &first.members[0], true, "stale hold").unwrap();
        remove_revision(&store, &first.members[1], "withdrawn").unwrap();

        let report = overview_on(&store, &index.id, "2026-08-20").unwrap();
        assert_eq!(report.entry_count, 3);
        assert_eq!(report.revisions_received, 3);
        // Rev A twice; rev B is a resubmission.
        assert_eq!(report.first_submission_count, 2);
        assert_eq!(report.held_count, 1);
        assert_eq!(report.deleted_count, 1);
        // VP-001 target passed without client review; VP-002 not due yet.
        assert_eq!(report.delayed_count, 1);
    }

    #[test]
    fn client_review_clears_the_delay() {
        let store = store();
        let index =
            create_index(&store, "VEN-01", &[planned("VP-001", Some("2026-08-01"))]).unwrap();
        let transmittal = transmit(&store, "01-02-T-001", &[received("VP-001", "A")]);

        let report = overview_on(&store, &index.id, "2026-08-20").unwrap();
        assert_eq!(report.delayed_count, 1);

        advance(
            &store,
            &LedgerTarget::Transmittal(transmittal.id.clone()),
            &AdvanceRequest {
                direction: DirectionCode::ClientToInternal,
                correspondence_ref: "02-01-T-007".into(),
                status: StatusCode::ClientReviewed,
                result_code: Some(ResultCode::Approved),
                reply_code: None,
                occurred_at: None,
            },
        )
        .unwrap();

        let report = overview_on(&store, &index.id, "2026-08-20").unwrap();
        assert_eq!(report.delayed_count, 0);
    }

    #[test]
    fn breakdown_orders_by_first_appearance() {
        let store = store();
        let index = create_index(
            &store,
            "VEN-01",
            &[
                planned("VP-001", None),
                planned("VP-002", None),
                planned("VP-003", None),
                planned("VP-004", None),
            ],
        )
        .unwrap();
        transmit(
            &store,
            "01-02-T-001",
            &[received("VP-001", "A"), received("VP-003", "A")],
        );

        // Register order: received, untouched, received, untouched.
        let buckets = status_breakdown(&store, &index.id).unwrap();
        let codes: Vec<&str> = buckets.iter().map(|b| b.status_code.as_str()).collect();
        assert_eq!(codes, vec!["10", "00"]);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].count, 2);
    }

    #[test]
    fn breakdown_tolerates_unknown_stored_codes() {
        let store = store();
        let index = create_index(&store, "VEN-01", &[planned("VP-001", None)]).unwrap();
        let transmittal = transmit(&store, "01-02-T-001", &[received("VP-001", "A")]);

        // A code written by some newer schema revision.
        store
            .append_events(&[docket_store::LedgerInsert {
                owner: transmittal.members[0].as_str().to_string(),
                event_id: docket_core::id::EventId::generate(),
                direction: "09".into(),
                correspondence_ref: "01-02-T-001".into(),
                status: "77".into(),
                result_code: None,
                reply_code: None,
                source_event_id: None,
                recorded_at: docket_core::clock::now_rfc3339(),
            }])
            .unwrap();

        let buckets = status_breakdown(&store, &index.id).unwrap();
        assert_eq!(buckets[0].status_code, "77");
        assert_eq!(buckets[0].status_label, "Unknown (77)");
    }
}
