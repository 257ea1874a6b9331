//! The latest-submission view: one line per entry across all of a vendor's
//! registers.

use docket_core::error::{Error, Result};
use docket_core::id::EntryId;
use docket_store::SqliteStore;
use serde::Serialize;

use crate::paging::{self, Page, LATEST_PAGE_SIZE};
use crate::resolve;

/// One line of the latest-per-entry report. The revision fields are absent
/// for entries nothing has been received against; the status fields always
/// carry a value, falling back to the `00` sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct LatestRow {
    pub entry_id: EntryId,
    pub document_number: String,
    pub document_title: String,
    pub target_date: Option<String>,
    pub revision_label: Option<String>,
    pub direction_code: Option<String>,
    pub direction_label: Option<String>,
    pub status_code: String,
    pub status_label: String,
}

/// Latest submission state for every active entry belonging to the vendor,
/// in creation order, paged by entry.
pub fn latest_per_entry(
    store: &SqliteStore,
    vendor_ref: &str,
    page: u32,
) -> Result<Page<LatestRow>> {
    store
        .find_vendor_index(vendor_ref)?
        .ok_or_else(|| Error::not_found("register for vendor", vendor_ref))?;
    let (limit, offset) = paging::window(page, LATEST_PAGE_SIZE)?;
    let rows = store.load_vendor_chains_page(vendor_ref, limit, offset)?;
    let total_items = store.count_vendor_entries(vendor_ref)?;

    let items = rows
        .into_iter()
        .map(|row| {
            let latest = resolve::latest_revision(&row.chain);
            let movement = latest.and_then(|r| r.last_movement());
            LatestRow {
                revision_label: latest.map(|r| r.revision_label.clone()),
                direction_code: movement.map(|m| m.direction.clone()),
                direction_label: movement.map(|m| m.direction_label()),
                status_code: resolve::current_status_code(&row.chain).to_string(),
                status_label: resolve::current_status_label(&row.chain),
                entry_id: row.entry.id,
                document_number: row.entry.document_number,
                document_title: row.entry.document_title,
                target_date: row.entry.target_date,
            }
        })
        .collect();

    Ok(Page {
        items,
        page,
        page_size: LATEST_PAGE_SIZE,
        total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::codes::{DirectionCode, ResultCode, StatusCode};
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

    #[test]
    fn one_line_per_entry_in_creation_order() {
        let store = store();
        create_index(
            &store,
            "VEN-01",
            &[planned("VP-001"), planned("VP-002"), planned("VP-003")],
        )
        .unwrap();
        let transmittal = create_transmittal(
            &store,
            &NewTransmittal {
                vendor_ref: "VEN-01".into(),
                sender: "01".into(),
                receiver: "02".into(),
                correspondence_ref: "01-02-T-001".into(),
                occurred_at: None,
            },
            &[received("VP-002", "A")],
        )
        .unwrap();
        advance(
            &store,
            &LedgerTarget::Transmittal(transmittal.id),
            &AdvanceRequest {
                direction: DirectionCode::ClientToInternal,
                correspondence_ref: "02-01-T-004".into(),
                status: StatusCode::ClientReviewed,
                result_code: Some(ResultCode::ReviseAndResubmit),
                reply_code: None,
                occurred_at: None,
            },
        )
        .unwrap();
        // The resubmission becomes the entry's current word.
        create_transmittal(
            &store,
            &NewTransmittal {
                vendor_ref: "VEN-01".into(),
                sender: "01".into(),
                receiver: "02".into(),
                correspondence_ref: "01-02-T-002".into(),
                occurred_at: None,
            },
            &[received("VP-002", "B")],
        )
        .unwrap();

        let page = latest_per_entry(&store, "VEN-01", 1).unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.items.len(), 3);

        let numbers: Vec<&str> = page
            .items
            .iter()
            .map(|r| r.document_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["VP-001", "VP-002", "VP-003"]);

        let untouched = &page.items[0];
        assert_eq!(untouched.revision_label, None);
        assert_eq!(untouched.direction_code, None);
        assert_eq!(untouched.status_code, "00");
        assert_eq!(untouched.status_label, "Not Received");

        let current = &page.items[1];
        assert_eq!(current.revision_label.as_deref(), Some("B"));
        assert_eq!(current.status_code, "10");
        assert_eq!(current.direction_code.as_deref(), Some("01"));
        assert_eq!(current.direction_label.as_deref(), Some("Vendor to Internal"));
    }

    #[test]
    fn spans_every_active_register_of_the_vendor() {
        let store = store();
        create_index(&store, "VEN-01", &[planned("VP-001")]).unwrap();
        // A later engagement opens a second register for the same vendor.
        create_index(&store, "VEN-01", &[planned("VP-100"), planned("VP-101")]).unwrap();

        let page = latest_per_entry(&store, "VEN-01", 1).unwrap();
        assert_eq!(page.total_items, 3);
        let numbers: Vec<&str> = page
            .items
            .iter()
            .map(|r| r.document_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["VP-001", "VP-100", "VP-101"]);
    }

    #[test]
    fn pages_by_entry() {
        let store = store();
        let rows: Vec<PlannedRow> = (1..=35).map(|i| planned(&format!("VP-{i:03}"))).collect();
        create_index(&store, "VEN-01", &rows).unwrap();

        let first = latest_per_entry(&store, "VEN-01", 1).unwrap();
        assert_eq!(first.items.len(), 30);
        assert_eq!(first.total_pages(), 2);
        let second = latest_per_entry(&store, "VEN-01", 2).unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.items[0].document_number, "VP-031");
    }

    #[test]
    fn unknown_vendor_is_not_found() {
        let store = store();
        let err = latest_per_entry(&store, "VEN-99", 1).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
