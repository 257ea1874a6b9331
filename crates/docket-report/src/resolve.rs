//! The one definition of "current status" every report reads through.

use docket_core::codes::{self, StatusCode};
use docket_core::entity::DocumentRevision;

/// The latest revision of a chain. Removal marks are deliberately ignored
/// here: a withdrawn submission is still the most recent word on the
/// document, and resolving past it would resurrect an older status.
#[must_use]
pub fn latest_revision(chain: &[DocumentRevision]) -> Option<&DocumentRevision> {
    chain.last()
}

/// Current status code of a chain. An empty chain, or a latest revision
/// that was never transmitted, resolves to the `00` sentinel rather than
/// an error.
#[must_use]
pub fn current_status_code(chain: &[DocumentRevision]) -> &str {
    latest_revision(chain)
        .and_then(|revision| revision.current_status())
        .map(|state| state.status.as_str())
        .unwrap_or_else(|| StatusCode::NotReceived.code())
}

/// Label for the chain's current status, with the unknown-code fallback.
#[must_use]
pub fn current_status_label(chain: &[DocumentRevision]) -> String {
    codes::status_label_for(current_status_code(chain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::clock::now_rfc3339;
    use docket_core::entity::Removal;
    use docket_core::id::{EntryId, EventId, RevisionId};
    use docket_core::ledger::{EventLedger, StatusEvent, TransmittalEvent};

    fn revision(label: &str, statuses: &[&str]) -> DocumentRevision {
        let mut ledger = EventLedger::new();
        for status in statuses {
            let event_id = EventId::generate();
            ledger
                .append(
                    TransmittalEvent {
                        event_id: event_id.clone(),
                        direction: "01".into(),
                        correspondence_ref: "01-02-T-001".into(),
                        recorded_at: now_rfc3339(),
                    },
                    StatusEvent {
                        event_id,
                        status: (*status).into(),
                        result_code: None,
                        reply_code: None,
                        recorded_at: now_rfc3339(),
                    },
                )
                .unwrap();
        }
        DocumentRevision {
            id: RevisionId::generate(),
            entry_id: EntryId::generate(),
            vendor_ref: "VEN-01".into(),
            category_ref: None,
            revision_label: label.into(),
            ledger,
            holds: Vec::new(),
            removed: Removal::none(),
            created_at: now_rfc3339(),
        }
    }

    #[test]
    fn empty_chain_is_the_sentinel() {
        assert_eq!(current_status_code(&[]), "00");
        assert_eq!(current_status_label(&[]), "Not Received");
    }

    #[test]
    fn untransmitted_latest_revision_is_the_sentinel() {
        let chain = vec![revision("A", &["10", "21"]), revision("B", &[])];
        assert_eq!(current_status_code(&chain), "00");
    }

    #[test]
    fn latest_revision_wins_even_when_removed() {
        let mut chain = vec![revision("A", &["10", "21"]), revision("B", &["10"])];
        chain[1].removed = Removal::recorded("withdrawn", now_rfc3339());
        assert_eq!(latest_revision(&chain).unwrap().revision_label, "B");
        assert_eq!(current_status_code(&chain), "10");
    }

    #[test]
    fn unknown_codes_get_the_fallback_label() {
        let chain = vec![revision("A", &["77"])];
        assert_eq!(current_status_code(&chain), "77");
        assert_eq!(current_status_label(&chain), "Unknown (77)");
    }
}
