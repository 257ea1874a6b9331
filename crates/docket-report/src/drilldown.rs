//! Per-entry drilldown: the register rows for one page, each carrying a
//! window of its revision chain.

use docket_core::entity::{DocumentEntry, DocumentRevision};
use docket_core::error::Result;
use docket_core::id::DocumentIndexId;
use docket_store::SqliteStore;
use serde::Serialize;

use crate::paging::{self, Page, DRILLDOWN_PAGE_SIZE};
use crate::resolve;

/// One drilldown row. `revisions` holds the page window of the chain; the
/// status fields are resolved from the full chain before slicing, so a
/// window that cuts off the tail still reports the true current status.
#[derive(Debug, Clone, Serialize)]
pub struct DrilldownEntry {
    pub entry: DocumentEntry,
    pub revisions: Vec<DocumentRevision>,
    pub chain_length: u64,
    pub current_status_code: String,
    pub current_status_label: String,
}

/// Pages through a register's active entries. Page boundaries align to
/// entries, and the same page window is applied to each entry's chain:
/// page 2 shows entries six through ten with revisions six through ten of
/// their chains.
pub fn drilldown(
    store: &SqliteStore,
    index_id: &DocumentIndexId,
    page: u32,
) -> Result<Page<DrilldownEntry>> {
    store.get_index(index_id)?;
    let (limit, offset) = paging::window(page, DRILLDOWN_PAGE_SIZE)?;
    let rows = store.load_entry_chains_page(index_id, limit, offset)?;
    let total_items = store.count_active_entries(index_id)?;

    let items = rows
        .into_iter()
        .map(|row| {
            let chain_length = row.chain.len() as u64;
            let code = resolve::current_status_code(&row.chain).to_string();
            let label = resolve::current_status_label(&row.chain);
            let start = usize::min(offset as usize, row.chain.len());
            let end = usize::min(start + DRILLDOWN_PAGE_SIZE as usize, row.chain.len());
            DrilldownEntry {
                entry: row.entry,
                revisions: row.chain[start..end].to_vec(),
                chain_length,
                current_status_code: code,
                current_status_label: label,
            }
        })
        .collect();

    Ok(Page {
        items,
        page,
        page_size: DRILLDOWN_PAGE_SIZE,
        total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::codes::{DirectionCode, ResultCode, StatusCode};
    use docket_core::error::Error;
    use docket_flow::{
        advance, create_index, create_transmittal, AdvanceRequest, LedgerTarget, NewTransmittal,
        PlannedRow, ReceivedRow,
    };

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn planned(number: &str) -> PlannedRow {
        PlannedRow {
            document_number: number.into(),
            document_title: format!("Title {number}"),
            category_ref: None,
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

    fn step(direction: DirectionCode, status: StatusCode, reference: &str) -> AdvanceRequest {
        AdvanceRequest {
            direction,
            correspondence_ref: reference.into(),
            status,
            result_code: matches!(direction, DirectionCode::ClientToInternal)
                .then_some(ResultCode::Approved),
            reply_code: None,
            occurred_at: None,
        }
    }

    #[test]
    fn full_review_loop_lands_in_page_one() {
        let store = store();
        let index = create_index(&store, "VEN-01", &[planned("DOC-001")]).unwrap();
        let transmittal = create_transmittal(
            &store,
            &NewTransmittal {
                vendor_ref: "VEN-01".into(),
                sender: "01".into(),
                receiver: "02".into(),
                correspondence_ref: "01-02-T-001".into(),
                occurred_at: None,
            },
            &[received("DOC-001", "A")],
        )
        .unwrap();

        let target = LedgerTarget::Transmittal(transmittal.id.clone());
        advance(&store, &target, &step(DirectionCode::VendorToInternal, StatusCode::InternalReviewed, "01-02-T-001")).unwrap();
        advance(&store, &target, &step(DirectionCode::InternalToClient, StatusCode::SentToClient, "01-02-T-002")).unwrap();
        advance(&store, &target, &step(DirectionCode::ClientToInternal, StatusCode::ClientReviewed, "02-01-T-005")).unwrap();

        let page = drilldown(&store, &index.id, 1).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.items.len(), 1);

        let row = &page.items[0];
        assert_eq!(row.entry.document_number, "DOC-001");
        assert_eq!(row.chain_length, 1);
        assert_eq!(row.revisions.len(), 1);
        assert_eq!(row.current_status_code, "21");
        assert_eq!(row.current_status_label, "Client Reviewed");
        let state = row.revisions[0].current_status().unwrap();
        assert_eq!(state.status, "21");
        assert_eq!(state.result_code.as_deref(), Some("01"));
    }

    #[test]
    fn pages_align_to_entries_and_window_the_chain() {
        let store = store();
        let rows: Vec<PlannedRow> = (1..=7).map(|i| planned(&format!("VP-{i:03}"))).collect();
        let index = create_index(&store, "VEN-01", &rows).unwrap();
        // VP-001 accumulates seven revisions, one per transmittal.
        let mut latest_transmittal = None;
        for (i, label) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            let transmittal = create_transmittal(
                &store,
                &NewTransmittal {
                    vendor_ref: "VEN-01".into(),
                    sender: "01".into(),
                    receiver: "02".into(),
                    correspondence_ref: format!("01-02-T-{:03}", i + 1),
                    occurred_at: None,
                },
                &[received("VP-001", label)],
            )
            .unwrap();
            latest_transmittal = Some(transmittal);
        }
        // Rev G alone reaches client review.
        advance(
            &store,
            &LedgerTarget::Transmittal(latest_transmittal.unwrap().id),
            &step(DirectionCode::ClientToInternal, StatusCode::ClientReviewed, "02-01-T-009"),
        )
        .unwrap();

        let first = drilldown(&store, &index.id, 1).unwrap();
        assert_eq!(first.total_items, 7);
        assert_eq!(first.total_pages(), 2);
        assert_eq!(first.items.len(), 5);
        // Page one windows the chain to its first five revisions.
        let chain_page = &first.items[0];
        assert_eq!(chain_page.chain_length, 7);
        assert_eq!(chain_page.revisions.len(), 5);
        assert_eq!(chain_page.revisions[4].revision_label, "E");
        // The status comes from rev G, even though the window stops at E.
        assert_eq!(chain_page.current_status_code, "21");

        let second = drilldown(&store, &index.id, 2).unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].entry.document_number, "VP-006");
        // VP-006 has no revisions; its windowed chain is empty either way.
        assert!(second.items[0].revisions.is_empty());
        assert_eq!(second.items[0].current_status_code, "00");

        let beyond = drilldown(&store, &index.id, 3).unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_items, 7);
    }

    #[test]
    fn page_two_windows_deep_chains() {
        let store = store();
        let index = create_index(&store, "VEN-01", &(1..=6).map(|i| planned(&format!("VP-{i:03}"))).collect::<Vec<_>>()).unwrap();
        for (i, label) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            create_transmittal(
                &store,
                &NewTransmittal {
                    vendor_ref: "VEN-01".into(),
                    sender: "01".into(),
                    receiver: "02".into(),
                    correspondence_ref: format!("01-02-T-{:03}", i + 1),
                    occurred_at: None,
                },
                &[received("VP-006", label)],
            )
            .unwrap();
        }

        // Page 2 holds only VP-006, with revisions six and seven of its chain.
        let page = drilldown(&store, &index.id, 2).unwrap();
        assert_eq!(page.items.len(), 1);
        let row = &page.items[0];
        assert_eq!(row.entry.document_number, "VP-006");
        assert_eq!(row.chain_length, 7);
        assert_eq!(row.revisions.len(), 2);
        assert_eq!(row.revisions[0].revision_label, "F");
        assert_eq!(row.revisions[1].revision_label, "G");
    }

    #[test]
    fn rejects_page_zero_and_missing_index() {
        let store = store();
        let index = create_index(&store, "VEN-01", &[planned("VP-001")]).unwrap();
        assert!(matches!(
            drilldown(&store, &index.id, 0).unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            drilldown(&store, &DocumentIndexId::generate(), 1).unwrap_err(),
            Error::NotFound { .. }
        ));
    }
}
