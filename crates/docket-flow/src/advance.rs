//! Recording workflow steps on revision and transmittal ledgers.

use docket_core::clock::{now_rfc3339, validate_timestamp};
use docket_core::codes::{DirectionCode, ReplyCode, ResultCode, StatusCode};
use docket_core::entity::{DocumentRevision, Transmittal};
use docket_core::error::{Error, Result};
use docket_core::id::{EventId, RevisionId, TransmittalId};
use docket_store::{LedgerInsert, Retraction, SqliteStore};

/// Which ledger a step is recorded against.
#[derive(Debug, Clone)]
pub enum LedgerTarget {
    Revision(RevisionId),
    Transmittal(TransmittalId),
}

/// One workflow step: the movement and the state it lands the document in.
#[derive(Debug, Clone)]
pub struct AdvanceRequest {
    pub direction: DirectionCode,
    pub correspondence_ref: String,
    pub status: StatusCode,
    pub result_code: Option<ResultCode>,
    pub reply_code: Option<ReplyCode>,
    /// When the step happened. Absent means now.
    pub occurred_at: Option<String>,
}

/// The reloaded entity after a ledger write.
#[derive(Debug, Clone)]
pub enum Advanced {
    Revision(DocumentRevision),
    Transmittal(Transmittal),
}

/// Hook for vetting a step against the current status before it is
/// recorded. The ledger is a record of what happened, not a gatekeeper,
/// so the stock guard accepts everything; a stricter policy can be slotted
/// in through [`advance_with_guard`].
pub trait TransitionGuard {
    fn check(&self, current_status: Option<&str>, request: &AdvanceRequest) -> Result<()>;
}

/// Accepts every transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl TransitionGuard for Permissive {
    fn check(&self, _current_status: Option<&str>, _request: &AdvanceRequest) -> Result<()> {
        Ok(())
    }
}

/// Appends one paired event to the target's ledger. On a transmittal the
/// same step fans out to every active member revision, each member getting
/// its own event id stamped with the transmittal event as source.
pub fn advance(
    store: &SqliteStore,
    target: &LedgerTarget,
    request: &AdvanceRequest,
) -> Result<Advanced> {
    advance_with_guard(store, target, request, &Permissive)
}

pub fn advance_with_guard(
    store: &SqliteStore,
    target: &LedgerTarget,
    request: &AdvanceRequest,
    guard: &dyn TransitionGuard,
) -> Result<Advanced> {
    check_codes(request)?;
    let recorded_at = stamp(request)?;
    match target {
        LedgerTarget::Revision(id) => {
            let revision = store.get_revision(id)?;
            guard.check(
                revision.current_status().map(|s| s.status.as_str()),
                request,
            )?;
            store.append_events(&[event_for(id.as_str(), request, None, &recorded_at)])?;
            tracing::info!(revision = %id, direction = request.direction.code(),
                status = request.status.code(), "advanced revision");
            store.get_revision(id).map(Advanced::Revision)
        }
        LedgerTarget::Transmittal(id) => {
            let transmittal = store.get_transmittal(id)?;
            guard.check(
                transmittal.current_status().map(|s| s.status.as_str()),
                request,
            )?;
            let root = event_for(id.as_str(), request, None, &recorded_at);
            let root_id = root.event_id.clone();
            let mut inserts = vec![root];
            for member in store.active_member_ids(id)? {
                inserts.push(event_for(member.as_str(), request, Some(&root_id), &recorded_at));
            }
            let fanned_out = inserts.len() - 1;
            store.append_events(&inserts)?;
            tracing::info!(transmittal = %id, direction = request.direction.code(),
                status = request.status.code(), fanned_out, "advanced transmittal");
            store.get_transmittal(id).map(Advanced::Transmittal)
        }
    }
}

/// Removes a recorded step from the target's ledger and, for a transmittal,
/// the fan-out copies on its members. A transmittal's opening event is kept:
/// retracting it returns the entity unchanged. Revision ledgers carry no such
/// floor and retract down to empty.
pub fn retract(
    store: &SqliteStore,
    target: &LedgerTarget,
    event_id: &EventId,
) -> Result<Advanced> {
    match target {
        LedgerTarget::Revision(id) => {
            store.get_revision(id)?;
            match store.retract_event(id.as_str(), event_id, false)? {
                Retraction::Missing => Err(Error::not_found("event", event_id)),
                Retraction::FirstEventKept | Retraction::Removed => {
                    store.get_revision(id).map(Advanced::Revision)
                }
            }
        }
        LedgerTarget::Transmittal(id) => {
            let transmittal = store.get_transmittal(id)?;
            match store.retract_event(id.as_str(), event_id, true)? {
                Retraction::Missing => Err(Error::not_found("event", event_id)),
                Retraction::FirstEventKept => Ok(Advanced::Transmittal(transmittal)),
                Retraction::Removed => store.get_transmittal(id).map(Advanced::Transmittal),
            }
        }
    }
}

fn check_codes(request: &AdvanceRequest) -> Result<()> {
    if request.direction.requires_result() && request.result_code.is_none() {
        return Err(Error::validation(format!(
            "direction {} ({}) carries a review outcome; result code is required",
            request.direction.code(),
            request.direction.label()
        )));
    }
    if request.direction.requires_reply() && request.reply_code.is_none() {
        return Err(Error::validation(format!(
            "direction {} ({}) carries the reply to the vendor; reply code is required",
            request.direction.code(),
            request.direction.label()
        )));
    }
    if request.correspondence_ref.trim().is_empty() {
        return Err(Error::validation("correspondence ref must not be empty"));
    }
    Ok(())
}

fn stamp(request: &AdvanceRequest) -> Result<String> {
    match &request.occurred_at {
        Some(at) => {
            validate_timestamp(at)?;
            Ok(at.clone())
        }
        None => Ok(now_rfc3339()),
    }
}

pub(crate) fn event_for(
    owner: &str,
    request: &AdvanceRequest,
    source: Option<&EventId>,
    recorded_at: &str,
) -> LedgerInsert {
    LedgerInsert {
        owner: owner.to_string(),
        event_id: EventId::generate(),
        direction: request.direction.code().to_string(),
        correspondence_ref: request.correspondence_ref.clone(),
        status: request.status.code().to_string(),
        result_code: request.result_code.map(|c| c.code().to_string()),
        reply_code: request.reply_code.map(|c| c.code().to_string()),
        source_event_id: source.cloned(),
        recorded_at: recorded_at.to_string(),
    }
}
