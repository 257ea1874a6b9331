//! Read-side reports over the docket register: rollup counts, status
//! breakdowns, per-entry drilldowns, latest-submission views, and paged
//! listings.
//!
//! Every report resolves "current status" through [`resolve`], so the
//! definition lives in exactly one place: the last revision of the chain,
//! removed or not, and the last status event on its ledger, with `00`
//! standing in for anything never transmitted.

pub mod drilldown;
pub mod latest;
pub mod listing;
pub mod overview;
pub mod paging;
pub mod resolve;

pub use drilldown::{drilldown, DrilldownEntry};
pub use latest::{latest_per_entry, LatestRow};
pub use listing::{
    list_correspondence, list_indexes, list_transmittals, overdue_correspondence,
    overdue_correspondence_on,
};
pub use overview::{overview, overview_on, status_breakdown, Overview, StatusBucket};
pub use paging::{
    Page, CORRESPONDENCE_PAGE_SIZE, DRILLDOWN_PAGE_SIZE, INDEX_PAGE_SIZE, LATEST_PAGE_SIZE,
    TRANSMITTAL_PAGE_SIZE,
};
pub use resolve::{current_status_code, current_status_label, latest_revision};
