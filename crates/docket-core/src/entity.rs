//! The record hierarchy: project, index, entry, revision, transmittal,
//! correspondence.
//!
//! Entities are read models assembled by the store. They serialize to JSON
//! for CLI output but are never deserialized back; all writes go through the
//! workflow operations.

use serde::{Deserialize, Serialize};

use crate::codes::{self, PartyRole};
use crate::id::{CorrespondenceId, DocumentIndexId, EntryId, ProjectId, RevisionId, TransmittalId};
use crate::ledger::{EventLedger, StatusEvent, TransmittalEvent};

/// Soft-delete marker. Removed records keep their history and stay
/// queryable by id; they only drop out of listings and aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

impl Removal {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn recorded(reason: impl Into<String>, at: impl Into<String>) -> Self {
        Self {
            flag: true,
            reason: Some(reason.into()),
            at: Some(at.into()),
        }
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.flag
    }
}

/// One suspension window on a revision. A release closes the open window
/// and is recorded as its own entry, so the history keeps every toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldPeriod {
    /// `true` places a hold, `false` records a release.
    pub flag: bool,
    pub reason: String,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

impl HoldPeriod {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.flag && self.ended_at.is_none()
    }
}

/// A received document revision and its paired event ledger.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRevision {
    pub id: RevisionId,
    pub entry_id: EntryId,
    pub vendor_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ref: Option<String>,
    pub revision_label: String,
    pub ledger: EventLedger,
    pub holds: Vec<HoldPeriod>,
    pub removed: Removal,
    pub created_at: String,
}

impl DocumentRevision {
    #[must_use]
    pub fn current_status(&self) -> Option<&StatusEvent> {
        self.ledger.last_status()
    }

    #[must_use]
    pub fn last_movement(&self) -> Option<&TransmittalEvent> {
        self.ledger.last_transmittal()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.holds.last().is_some_and(HoldPeriod::is_open)
    }

    /// First submissions carry label `A` or `0`, compared case-insensitively.
    #[must_use]
    pub fn is_initial_submission(&self) -> bool {
        let label = self.revision_label.trim();
        label.eq_ignore_ascii_case("a") || label == "0"
    }
}

/// One planned document line in a vendor's register.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub id: EntryId,
    pub index_id: DocumentIndexId,
    pub document_number: String,
    pub document_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ref: Option<String>,
    /// Contractual delivery date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    /// Revision chain, oldest first.
    pub revisions: Vec<RevisionId>,
    pub removed: Removal,
    pub created_at: String,
}

/// A vendor's document register.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentIndex {
    pub id: DocumentIndexId,
    pub vendor_ref: String,
    /// Entries in register order.
    pub entries: Vec<EntryId>,
    pub removed: Removal,
    pub created_at: String,
}

/// A batch of revisions that arrived or moved together and share a ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Transmittal {
    pub id: TransmittalId,
    pub vendor_ref: String,
    pub sender: String,
    pub receiver: String,
    pub correspondence_ref: String,
    /// Member revisions in attachment order.
    pub members: Vec<RevisionId>,
    pub ledger: EventLedger,
    pub canceled: Removal,
    pub created_at: String,
}

impl Transmittal {
    #[must_use]
    pub fn current_status(&self) -> Option<&StatusEvent> {
        self.ledger.last_status()
    }
}

/// An outbound correspondence record with reply tracking.
#[derive(Debug, Clone, Serialize)]
pub struct Correspondence {
    pub id: CorrespondenceId,
    pub project_id: ProjectId,
    /// Stored kind tag, `T` or `L`.
    pub kind: String,
    /// Free-form references to what the correspondence covers.
    pub links: Vec<String>,
    pub correspondence_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_reply_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_received: Option<String>,
    pub canceled: Removal,
    pub created_at: String,
}

impl Correspondence {
    #[must_use]
    pub fn kind_label(&self) -> String {
        codes::kind_label_for(&self.kind)
    }

    /// Whether the reply deadline has passed with no reply recorded.
    #[must_use]
    pub fn is_overdue_on(&self, today: &str) -> bool {
        if self.canceled.is_removed() || self.reply_received.is_some() {
            return false;
        }
        match &self.target_reply_date {
            Some(target) => target.as_str() < today,
            None => false,
        }
    }
}

/// Numbering and correspondence scope. Party codes are the project's own
/// short codes, not the `PartyRole` table codes.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client_code: String,
    pub contractor_code: String,
    pub created_at: String,
}

impl Project {
    #[must_use]
    pub fn code_for(&self, role: PartyRole) -> &str {
        match role {
            PartyRole::Contractor => &self.contractor_code,
            PartyRole::Client => &self.client_code,
        }
    }
}
