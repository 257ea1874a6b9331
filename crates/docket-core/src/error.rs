//! Error taxonomy shared by every Docket crate.
//!
//! Callers are expected to branch on the variant: `Validation` and `Conflict`
//! mean the request must change, `NotFound` means the target id is stale,
//! `PartialFailure` carries per-row diagnostics for batch ingestion, and
//! `Integrity` signals a broken ledger invariant that no request should be
//! able to produce.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The result type used throughout Docket.
pub type Result<T> = std::result::Result<T, Error>;

/// Why one row of an ingestion batch was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No active register entry carries the row's document number.
    UnknownDocument,
    /// The revision label already exists on the matched entry's chain.
    DuplicateRevision,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::UnknownDocument => write!(f, "unknown document number"),
            FailureReason::DuplicateRevision => write!(f, "duplicate revision label"),
        }
    }
}

/// One rejected row of an ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub document_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_label: Option<String>,
    pub reason: FailureReason,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision_label {
            Some(label) => write!(f, "{} rev {}: {}", self.document_number, label, self.reason),
            None => write!(f, "{}: {}", self.document_number, self.reason),
        }
    }
}

/// Errors that can occur in Docket operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request itself is malformed (unknown code, bad date, missing field).
    #[error("validation error: {0}")]
    Validation(String),

    /// The addressed record does not exist.
    #[error("not found: {kind} {id}")]
    NotFound {
        /// The kind of record that was looked up.
        kind: &'static str,
        /// The identifier or reference that missed.
        id: String,
    },

    /// The request collides with existing state (duplicate reference, label).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An ingestion batch was rejected; nothing was committed.
    #[error("batch rejected: {} row(s) failed", failures.len())]
    PartialFailure {
        /// The rows that could not be applied.
        failures: Vec<RowFailure>,
    },

    /// A stored ledger violates a structural invariant.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The underlying database failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem access around the database failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn not_found(kind: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    #[must_use]
    pub fn partial(failures: Vec<RowFailure>) -> Self {
        Self::PartialFailure { failures }
    }

    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }
}
