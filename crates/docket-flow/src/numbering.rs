//! Correspondence numbering and reply tracking.
//!
//! A correspondence ref reads `sender-receiver-kind-sequence`, e.g.
//! `01-02-T-014`: contractor to client, transmittal, fourteenth issued.
//! Sequences count per project and kind, and the issued ref is reserved the
//! moment it is handed out.

use docket_core::clock::{now_rfc3339, validate_date};
use docket_core::codes::{CorrespondenceKind, PartyRole};
use docket_core::entity::{Correspondence, Project, Removal};
use docket_core::error::{Error, Result};
use docket_core::id::{CorrespondenceId, ProjectId};
use docket_store::SqliteStore;

/// Parameters for registering an outbound letter or transmittal notice.
#[derive(Debug, Clone)]
pub struct NewCorrespondence {
    pub kind: CorrespondenceKind,
    pub sender: PartyRole,
    pub receiver: PartyRole,
    /// Document numbers or transmittal refs this letter is about.
    pub links: Vec<String>,
    /// Pre-issued ref (from [`next_correspondence_ref`]); generated when
    /// absent.
    pub correspondence_ref: Option<String>,
    pub send_date: Option<String>,
    pub target_reply_date: Option<String>,
}

pub fn register_project(
    store: &SqliteStore,
    name: &str,
    contractor_code: &str,
    client_code: &str,
) -> Result<Project> {
    if name.trim().is_empty() {
        return Err(Error::validation("project name must not be empty"));
    }
    if contractor_code.trim().is_empty() || client_code.trim().is_empty() {
        return Err(Error::validation("party codes must not be empty"));
    }
    let project = Project {
        id: ProjectId::generate(),
        name: name.to_string(),
        client_code: client_code.to_string(),
        contractor_code: contractor_code.to_string(),
        created_at: now_rfc3339(),
    };
    store.insert_project(&project)?;
    tracing::info!(id = %project.id, name, "registered project");
    store.get_project(&project.id)
}

/// Issues the next correspondence ref for a project. The sequence advances
/// even if the caller never files the letter; numbering gaps are fine,
/// collisions are not.
pub fn next_correspondence_ref(
    store: &SqliteStore,
    project_id: &ProjectId,
    kind: CorrespondenceKind,
    sender: PartyRole,
    receiver: PartyRole,
) -> Result<String> {
    let project = store.get_project(project_id)?;
    let sequence = store.next_sequence(project_id, kind.tag())?;
    Ok(format!(
        "{}-{}-{}-{:03}",
        project.code_for(sender),
        project.code_for(receiver),
        kind.tag(),
        sequence
    ))
}

/// Numbers and files a correspondence record in one step.
pub fn create_correspondence(
    store: &SqliteStore,
    project_id: &ProjectId,
    new: &NewCorrespondence,
) -> Result<Correspondence> {
    for date in [&new.send_date, &new.target_reply_date].into_iter().flatten() {
        validate_date(date)?;
    }
    let reference = match &new.correspondence_ref {
        Some(reference) if reference.trim().is_empty() => {
            return Err(Error::validation("correspondence ref must not be empty"));
        }
        Some(reference) => reference.clone(),
        None => next_correspondence_ref(store, project_id, new.kind, new.sender, new.receiver)?,
    };
    let letter = Correspondence {
        id: CorrespondenceId::generate(),
        project_id: project_id.clone(),
        kind: new.kind.tag().to_string(),
        links: new.links.clone(),
        correspondence_ref: reference,
        send_date: new.send_date.clone(),
        target_reply_date: new.target_reply_date.clone(),
        reply_received: None,
        canceled: Removal::none(),
        created_at: now_rfc3339(),
    };
    store.insert_correspondence(&letter)?;
    tracing::info!(id = %letter.id, correspondence_ref = %letter.correspondence_ref,
        "filed correspondence");
    store.get_correspondence(&letter.id)
}

pub fn mark_reply_received(
    store: &SqliteStore,
    id: &CorrespondenceId,
    date: &str,
) -> Result<Correspondence> {
    validate_date(date)?;
    store.set_reply_received(id, date)?;
    store.get_correspondence(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn outbound(kind: CorrespondenceKind, target: Option<&str>) -> NewCorrespondence {
        NewCorrespondence {
            kind,
            sender: PartyRole::Contractor,
            receiver: PartyRole::Client,
            links: vec!["VP-001".into()],
            correspondence_ref: None,
            send_date: Some("2026-08-01".into()),
            target_reply_date: target.map(Into::into),
        }
    }

    #[test]
    fn refs_follow_the_numbering_scheme() {
        let store = store();
        let project = register_project(&store, "Harbour Expansion", "01", "02").unwrap();

        let first = create_correspondence(
            &store,
            &project.id,
            &outbound(CorrespondenceKind::Transmittal, None),
        )
        .unwrap();
        assert_eq!(first.correspondence_ref, "01-02-T-001");

        let second = create_correspondence(
            &store,
            &project.id,
            &outbound(CorrespondenceKind::Transmittal, None),
        )
        .unwrap();
        assert_eq!(second.correspondence_ref, "01-02-T-002");

        // Letters count separately from transmittals.
        let letter = create_correspondence(
            &store,
            &project.id,
            &outbound(CorrespondenceKind::Letter, None),
        )
        .unwrap();
        assert_eq!(letter.correspondence_ref, "01-02-L-001");
    }

    #[test]
    fn inbound_refs_swap_the_party_codes() {
        let store = store();
        let project = register_project(&store, "Harbour Expansion", "07", "30").unwrap();
        let inbound = NewCorrespondence {
            kind: CorrespondenceKind::Letter,
            sender: PartyRole::Client,
            receiver: PartyRole::Contractor,
            links: Vec::new(),
            correspondence_ref: None,
            send_date: None,
            target_reply_date: None,
        };
        let letter = create_correspondence(&store, &project.id, &inbound).unwrap();
        assert_eq!(letter.correspondence_ref, "30-07-L-001");
    }

    #[test]
    fn issued_refs_survive_unfiled_letters() {
        let store = store();
        let project = register_project(&store, "Harbour Expansion", "01", "02").unwrap();

        let issued = next_correspondence_ref(
            &store,
            &project.id,
            CorrespondenceKind::Transmittal,
            PartyRole::Contractor,
            PartyRole::Client,
        )
        .unwrap();
        assert_eq!(issued, "01-02-T-001");

        // A pre-issued ref can be filed later as-is.
        let mut prefiled = outbound(CorrespondenceKind::Transmittal, None);
        prefiled.correspondence_ref = Some(issued.clone());
        let filed = create_correspondence(&store, &project.id, &prefiled).unwrap();
        assert_eq!(filed.correspondence_ref, issued);

        // Generated refs never reuse a consumed sequence number.
        let next = create_correspondence(
            &store,
            &project.id,
            &outbound(CorrespondenceKind::Transmittal, None),
        )
        .unwrap();
        assert_eq!(next.correspondence_ref, "01-02-T-002");
    }

    #[test]
    fn reply_tracking_round_trip() {
        let store = store();
        let project = register_project(&store, "Harbour Expansion", "01", "02").unwrap();
        let letter = create_correspondence(
            &store,
            &project.id,
            &outbound(CorrespondenceKind::Letter, Some("2026-08-15")),
        )
        .unwrap();
        assert!(letter.is_overdue_on("2026-08-20"));

        let err = mark_reply_received(&store, &letter.id, "not a date").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let replied = mark_reply_received(&store, &letter.id, "2026-08-18").unwrap();
        assert_eq!(replied.reply_received.as_deref(), Some("2026-08-18"));
        assert!(!replied.is_overdue_on("2026-08-20"));
    }

    #[test]
    fn project_validation() {
        let store = store();
        assert!(matches!(
            register_project(&store, " ", "01", "02").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            register_project(&store, "Harbour", "", "02").unwrap_err(),
            Error::Validation(_)
        ));
    }
}
