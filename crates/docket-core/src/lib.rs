pub mod clock;
pub mod codes;
pub mod entity;
pub mod error;
pub mod id;
pub mod ledger;

pub use codes::{
    CorrespondenceKind, DirectionCode, PartyRole, ReplyCode, ResultCode, StatusCode,
};
pub use entity::{
    Correspondence, DocumentEntry, DocumentIndex, DocumentRevision, HoldPeriod, Project, Removal,
    Transmittal,
};
pub use error::{Error, FailureReason, Result, RowFailure};
pub use id::{
    CorrespondenceId, DocumentIndexId, EntryId, EventId, ProjectId, RevisionId, TransmittalId,
};
pub use ledger::{EventLedger, StatusEvent, TransmittalEvent};
