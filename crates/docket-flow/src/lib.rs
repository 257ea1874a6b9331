//! Workflow operations over the docket store: receiving document batches,
//! recording review steps, issuing correspondence numbers, and retiring
//! records.
//!
//! Every operation validates its inputs up front, writes through
//! [`docket_store::SqliteStore`] in a single transaction, and returns the
//! reloaded entity.

pub mod advance;
pub mod attach;
pub mod entries;
pub mod numbering;
pub mod remove;

pub use advance::{
    advance, advance_with_guard, retract, AdvanceRequest, Advanced, LedgerTarget, Permissive,
    TransitionGuard,
};
pub use attach::{attach_revisions, create_transmittal, AttachTarget, NewTransmittal, ReceivedRow};
pub use entries::{create_index, edit_entries, import_entries, EntryDelete, EntryUpsert, PlannedRow};
pub use numbering::{
    create_correspondence, mark_reply_received, next_correspondence_ref, register_project,
    NewCorrespondence,
};
pub use remove::{
    cancel_correspondence, cancel_transmittal, hold_revision, remove_index, remove_revision,
};
