//! Paged listings of registers, transmittals, and correspondence. Rows
//! retired by a soft delete or cancel are filtered out here; the records
//! themselves remain loadable by id.

use docket_core::clock::today;
use docket_core::entity::Correspondence;
use docket_core::error::Result;
use docket_core::id::ProjectId;
use docket_store::{IndexSummary, SqliteStore, TransmittalSummary};

use crate::paging::{
    self, Page, CORRESPONDENCE_PAGE_SIZE, INDEX_PAGE_SIZE, TRANSMITTAL_PAGE_SIZE,
};

pub fn list_indexes(store: &SqliteStore, page: u32) -> Result<Page<IndexSummary>> {
    let (limit, offset) = paging::window(page, INDEX_PAGE_SIZE)?;
    Ok(Page {
        items: store.list_indexes(limit, offset)?,
        page,
        page_size: INDEX_PAGE_SIZE,
        total_items: store.count_indexes()?,
    })
}

pub fn list_transmittals(
    store: &SqliteStore,
    vendor_ref: Option<&str>,
    page: u32,
) -> Result<Page<TransmittalSummary>> {
    let (limit, offset) = paging::window(page, TRANSMITTAL_PAGE_SIZE)?;
    Ok(Page {
        items: store.list_transmittals(vendor_ref, limit, offset)?,
        page,
        page_size: TRANSMITTAL_PAGE_SIZE,
        total_items: store.count_transmittals(vendor_ref)?,
    })
}

pub fn list_correspondence(
    store: &SqliteStore,
    project_id: Option<&ProjectId>,
    page: u32,
) -> Result<Page<Correspondence>> {
    let (limit, offset) = paging::window(page, CORRESPONDENCE_PAGE_SIZE)?;
    Ok(Page {
        items: store.list_correspondence(project_id, limit, offset)?,
        page,
        page_size: CORRESPONDENCE_PAGE_SIZE,
        total_items: store.count_correspondence(project_id)?,
    })
}

/// Letters whose reply deadline has passed, oldest deadline first.
pub fn overdue_correspondence(
    store: &SqliteStore,
    project_id: &ProjectId,
) -> Result<Vec<Correspondence>> {
    overdue_correspondence_on(store, project_id, &today())
}

pub fn overdue_correspondence_on(
    store: &SqliteStore,
    project_id: &ProjectId,
    today: &str,
) -> Result<Vec<Correspondence>> {
    store.get_project(project_id)?;
    store.outstanding_replies(project_id, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::codes::{CorrespondenceKind, PartyRole};
    use docket_core::error::Error;
    use docket_flow::{
        cancel_transmittal, create_correspondence, create_index, create_transmittal,
        register_project, NewCorrespondence, NewTransmittal, PlannedRow, ReceivedRow,
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

    #[test]
    fn index_listing_pages_at_eight() {
        let store = store();
        for i in 1..=9 {
            create_index(&store, &format!("VEN-{i:02}"), &[planned("VP-001")]).unwrap();
        }

        let first = list_indexes(&store, 1).unwrap();
        assert_eq!(first.items.len(), 8);
        assert_eq!(first.total_items, 9);
        assert_eq!(first.total_pages(), 2);
        assert_eq!(first.items[0].vendor_ref, "VEN-01");
        assert_eq!(first.items[0].entry_count, 1);

        let second = list_indexes(&store, 2).unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].vendor_ref, "VEN-09");
    }

    #[test]
    fn transmittal_listing_filters_vendor_and_canceled() {
        let store = store();
        create_index(&store, "VEN-01", &[planned("VP-001"), planned("VP-002")]).unwrap();
        create_index(&store, "VEN-02", &[planned("VP-001")]).unwrap();

        let mine = create_transmittal(
            &store,
            &NewTransmittal {
                vendor_ref: "VEN-01".into(),
                sender: "01".into(),
                receiver: "02".into(),
                correspondence_ref: "01-02-T-001".into(),
                occurred_at: None,
            },
            &[ReceivedRow {
                document_number: "VP-001".into(),
                document_title: "Title VP-001".into(),
                revision_label: "A".into(),
            }],
        )
        .unwrap();
        let other = create_transmittal(
            &store,
            &NewTransmittal {
                vendor_ref: "VEN-02".into(),
                sender: "01".into(),
                receiver: "02".into(),
                correspondence_ref: "01-02-T-002".into(),
                occurred_at: None,
            },
            &[ReceivedRow {
                document_number: "VP-001".into(),
                document_title: "Title VP-001".into(),
                revision_label: "A".into(),
            }],
        )
        .unwrap();

        let all = list_transmittals(&store, None, 1).unwrap();
        assert_eq!(all.total_items, 2);
        let filtered = list_transmittals(&store, Some("VEN-01"), 1).unwrap();
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(filtered.items[0].id, mine.id);
        assert_eq!(filtered.items[0].last_status.as_deref(), Some("10"));

        cancel_transmittal(&store, &other.id, "void").unwrap();
        let all = list_transmittals(&store, None, 1).unwrap();
        assert_eq!(all.total_items, 1);
    }

    #[test]
    fn overdue_letters_need_a_real_project() {
        let store = store();
        let err = overdue_correspondence(&store, &ProjectId::generate()).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "project", .. }));

        let project = register_project(&store, "Harbour Expansion", "01", "02").unwrap();
        create_correspondence(
            &store,
            &project.id,
            &NewCorrespondence {
                kind: CorrespondenceKind::Letter,
                sender: PartyRole::Contractor,
                receiver: PartyRole::Client,
                links: Vec::new(),
                correspondence_ref: None,
                send_date: Some("2026-08-01".into()),
                target_reply_date: Some("2026-08-10".into()),
            },
        )
        .unwrap();

        let overdue = overdue_correspondence_on(&store, &project.id, "2026-08-20").unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].correspondence_ref, "01-02-L-001");
        assert!(overdue_correspondence_on(&store, &project.id, "2026-08-05")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn correspondence_listing_pages_at_ten() {
        let store = store();
        let project = register_project(&store, "Harbour Expansion", "01", "02").unwrap();
        for _ in 0..12 {
            create_correspondence(
                &store,
                &project.id,
                &NewCorrespondence {
                    kind: CorrespondenceKind::Transmittal,
                    sender: PartyRole::Contractor,
                    receiver: PartyRole::Client,
                    links: Vec::new(),
                    correspondence_ref: None,
                    send_date: None,
                    target_reply_date: None,
                },
            )
            .unwrap();
        }

        let first = list_correspondence(&store, Some(&project.id), 1).unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages(), 2);
        let second = list_correspondence(&store, Some(&project.id), 2).unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].correspondence_ref, "01-02-T-011");
    }
}
