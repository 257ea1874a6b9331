//! Building and editing a vendor's register of planned documents.

use docket_core::clock::{now_rfc3339, validate_date};
use docket_core::entity::{DocumentEntry, DocumentIndex, Removal};
use docket_core::error::{Error, Result};
use docket_core::id::{DocumentIndexId, EntryId};
use docket_store::{EntryUpdate, SqliteStore};
use serde::Deserialize;

/// One row of a planned-documents file. Optional columns left blank in the
/// file come through as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannedRow {
    pub document_number: String,
    pub document_title: String,
    #[serde(default)]
    pub category_ref: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

/// One upsert in an index edit. With an id it rewrites that entry's mutable
/// fields; without one it adds a new entry, which then needs a document
/// number.
#[derive(Debug, Clone)]
pub struct EntryUpsert {
    pub id: Option<EntryId>,
    pub document_number: Option<String>,
    pub document_title: String,
    pub category_ref: Option<String>,
    pub target_date: Option<String>,
}

/// One removal in an index edit.
#[derive(Debug, Clone)]
pub struct EntryDelete {
    pub id: EntryId,
    pub reason: Option<String>,
}

/// Opens a register for a vendor engagement from a planned-documents file.
pub fn create_index(
    store: &SqliteStore,
    vendor_ref: &str,
    rows: &[PlannedRow],
) -> Result<DocumentIndex> {
    if vendor_ref.trim().is_empty() {
        return Err(Error::validation("vendor ref must not be empty"));
    }
    let index = DocumentIndex {
        id: DocumentIndexId::generate(),
        vendor_ref: vendor_ref.to_string(),
        entries: Vec::new(),
        removed: Removal::none(),
        created_at: now_rfc3339(),
    };
    let entries = plan_entries(&index.id, rows)?;
    store.create_index(&index, &entries)?;
    tracing::info!(id = %index.id, vendor_ref, entries = entries.len(), "opened register");
    store.get_index(&index.id)
}

/// Appends further planned documents to an existing register.
pub fn import_entries(
    store: &SqliteStore,
    index_id: &DocumentIndexId,
    rows: &[PlannedRow],
) -> Result<DocumentIndex> {
    store.get_index(index_id)?;
    let entries = plan_entries(index_id, rows)?;
    store.append_entries(index_id, &entries)?;
    store.get_index(index_id)
}

/// Reworks a register in one pass: rewrite some entries, add some, retire
/// others. Revision chains under a retired entry are left as they are.
pub fn edit_entries(
    store: &SqliteStore,
    index_id: &DocumentIndexId,
    upserts: &[EntryUpsert],
    deletes: &[EntryDelete],
) -> Result<DocumentIndex> {
    store.get_index(index_id)?;
    let mut updates = Vec::new();
    let mut creates = Vec::new();
    let created_at = now_rfc3339();

    for upsert in upserts {
        if let Some(date) = &upsert.target_date {
            validate_date(date)?;
        }
        if upsert.document_title.trim().is_empty() {
            return Err(Error::validation("document title must not be empty"));
        }
        match &upsert.id {
            Some(id) => {
                if upsert.document_number.is_some() {
                    return Err(Error::validation(
                        "document numbers are fixed once an entry exists",
                    ));
                }
                updates.push(EntryUpdate {
                    id: id.clone(),
                    document_title: upsert.document_title.clone(),
                    category_ref: upsert.category_ref.clone(),
                    target_date: upsert.target_date.clone(),
                });
            }
            None => {
                let number = upsert.document_number.as_deref().ok_or_else(|| {
                    Error::validation("new entries need a document number")
                })?;
                if number.trim().is_empty() {
                    return Err(Error::validation("document number must not be empty"));
                }
                creates.push(DocumentEntry {
                    id: EntryId::generate(),
                    index_id: index_id.clone(),
                    document_number: number.to_string(),
                    document_title: upsert.document_title.clone(),
                    category_ref: upsert.category_ref.clone(),
                    target_date: upsert.target_date.clone(),
                    revisions: Vec::new(),
                    removed: Removal::none(),
                    created_at: created_at.clone(),
                });
            }
        }
    }

    let removes: Vec<(EntryId, String)> = deletes
        .iter()
        .map(|d| {
            (
                d.id.clone(),
                d.reason.clone().unwrap_or_else(|| "removed".into()),
            )
        })
        .collect();

    store.apply_entry_edits(index_id, &updates, &creates, &removes, &created_at)?;
    tracing::info!(index = %index_id, updated = updates.len(), created = creates.len(),
        removed = removes.len(), "edited register");
    store.get_index(index_id)
}

fn plan_entries(index_id: &DocumentIndexId, rows: &[PlannedRow]) -> Result<Vec<DocumentEntry>> {
    let created_at = now_rfc3339();
    rows.iter()
        .map(|row| {
            if row.document_number.trim().is_empty() {
                return Err(Error::validation("document number must not be empty"));
            }
            if row.document_title.trim().is_empty() {
                return Err(Error::validation(format!(
                    "document {} has no title",
                    row.document_number
                )));
            }
            if let Some(date) = &row.target_date {
                validate_date(date)?;
            }
            Ok(DocumentEntry {
                id: EntryId::generate(),
                index_id: index_id.clone(),
                document_number: row.document_number.clone(),
                document_title: row.document_title.clone(),
                category_ref: row.category_ref.clone(),
                target_date: row.target_date.clone(),
                revisions: Vec::new(),
                removed: Removal::none(),
                created_at: created_at.clone(),
            })
        })
        .collect()
}
