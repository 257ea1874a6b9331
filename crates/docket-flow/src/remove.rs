//! Soft deletion and hold handling. Nothing here touches ledger history;
//! a removed revision or canceled transmittal keeps every event it ever
//! recorded.

use docket_core::clock::now_rfc3339;
use docket_core::entity::{Correspondence, DocumentIndex, DocumentRevision, Transmittal};
use docket_core::error::Result;
use docket_core::id::{CorrespondenceId, DocumentIndexId, RevisionId, TransmittalId};
use docket_store::SqliteStore;

pub fn remove_revision(
    store: &SqliteStore,
    id: &RevisionId,
    reason: &str,
) -> Result<DocumentRevision> {
    store.mark_revision_removed(id, reason, &now_rfc3339())?;
    store.get_revision(id)
}

/// Cancels a transmittal and marks its active members removed with the
/// same reason.
pub fn cancel_transmittal(
    store: &SqliteStore,
    id: &TransmittalId,
    reason: &str,
) -> Result<Transmittal> {
    let members = store.cancel_transmittal_cascading(id, reason, &now_rfc3339())?;
    tracing::info!(transmittal = %id, members, reason, "canceled transmittal");
    store.get_transmittal(id)
}

/// Retires a whole register: the index, its entries, and their revisions.
pub fn remove_index(
    store: &SqliteStore,
    id: &DocumentIndexId,
    reason: &str,
) -> Result<DocumentIndex> {
    store.remove_index_cascading(id, reason, &now_rfc3339())?;
    tracing::info!(index = %id, reason, "retired register");
    store.get_index(id)
}

pub fn cancel_correspondence(
    store: &SqliteStore,
    id: &CorrespondenceId,
    reason: &str,
) -> Result<Correspondence> {
    store.cancel_correspondence(id, reason, &now_rfc3339())?;
    store.get_correspondence(id)
}

/// Opens or releases a hold on a revision. Opening while another hold is
/// open closes the earlier period first.
pub fn hold_revision(
    store: &SqliteStore,
    id: &RevisionId,
    flag: bool,
    reason: &str,
) -> Result<DocumentRevision> {
    store.get_revision(id)?;
    store.append_hold(id, flag, reason, &now_rfc3339())?;
    tracing::info!(revision = %id, flag, reason, "recorded hold change");
    store.get_revision(id)
}
