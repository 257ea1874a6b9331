//! The paired, append-only event ledger.
//!
//! Every workflow step is recorded as one exchange with two halves under a
//! shared event id: a [`TransmittalEvent`] saying how the document moved and
//! a [`StatusEvent`] saying what state that movement produced. The halves
//! never advance independently. [`EventLedger`] keeps both sides private so
//! the only ways in are [`EventLedger::append`], which takes a matched pair,
//! and [`EventLedger::from_parts`], which re-checks the invariant on data
//! coming back from storage.
//!
//! Event fields hold raw stored code strings, not enums: historical rows may
//! carry codes this build no longer writes, and reads must render them
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::codes;
use crate::error::{Error, Result};
use crate::id::EventId;

/// The movement half of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmittalEvent {
    pub event_id: EventId,
    /// Stored direction code, e.g. `01`.
    pub direction: String,
    /// Reference of the carrying transmittal or letter.
    pub correspondence_ref: String,
    pub recorded_at: String,
}

impl TransmittalEvent {
    #[must_use]
    pub fn direction_label(&self) -> String {
        codes::direction_label_for(&self.direction)
    }
}

/// The state half of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub event_id: EventId,
    /// Stored status code, e.g. `10`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_code: Option<String>,
    pub recorded_at: String,
}

impl StatusEvent {
    #[must_use]
    pub fn status_label(&self) -> String {
        codes::status_label_for(&self.status)
    }
}

/// Ordered history of one revision or transmittal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventLedger {
    transmittal_events: Vec<TransmittalEvent>,
    status_events: Vec<StatusEvent>,
}

impl EventLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassembles a ledger from stored halves, re-checking the pairing
    /// invariant.
    pub fn from_parts(
        transmittal_events: Vec<TransmittalEvent>,
        status_events: Vec<StatusEvent>,
    ) -> Result<Self> {
        if transmittal_events.len() != status_events.len() {
            return Err(Error::integrity(format!(
                "ledger halves out of step: {} transmittal vs {} status events",
                transmittal_events.len(),
                status_events.len()
            )));
        }
        for (movement, state) in transmittal_events.iter().zip(&status_events) {
            if movement.event_id != state.event_id {
                return Err(Error::integrity(format!(
                    "ledger pair mismatch: {} next to {}",
                    movement.event_id, state.event_id
                )));
            }
        }
        Ok(Self {
            transmittal_events,
            status_events,
        })
    }

    /// Appends one exchange. Both halves must carry the same event id.
    pub fn append(&mut self, movement: TransmittalEvent, state: StatusEvent) -> Result<()> {
        if movement.event_id != state.event_id {
            return Err(Error::integrity(format!(
                "refusing unpaired append: {} next to {}",
                movement.event_id, state.event_id
            )));
        }
        self.transmittal_events.push(movement);
        self.status_events.push(state);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.status_events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status_events.is_empty()
    }

    #[must_use]
    pub fn transmittal_events(&self) -> &[TransmittalEvent] {
        &self.transmittal_events
    }

    #[must_use]
    pub fn status_events(&self) -> &[StatusEvent] {
        &self.status_events
    }

    #[must_use]
    pub fn last_transmittal(&self) -> Option<&TransmittalEvent> {
        self.transmittal_events.last()
    }

    #[must_use]
    pub fn last_status(&self) -> Option<&StatusEvent> {
        self.status_events.last()
    }

    /// Id of the oldest exchange, the one retraction refuses to touch.
    #[must_use]
    pub fn first_event_id(&self) -> Option<&EventId> {
        self.status_events.first().map(|s| &s.event_id)
    }

    #[must_use]
    pub fn contains(&self, event_id: &EventId) -> bool {
        self.status_events.iter().any(|s| &s.event_id == event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::now_rfc3339;

    fn pair(status: &str) -> (TransmittalEvent, StatusEvent) {
        let event_id = EventId::generate();
        let ts = now_rfc3339();
        (
            TransmittalEvent {
                event_id: event_id.clone(),
                direction: "01".into(),
                correspondence_ref: "01-02-T-001".into(),
                recorded_at: ts.clone(),
            },
            StatusEvent {
                event_id,
                status: status.into(),
                result_code: None,
                reply_code: None,
                recorded_at: ts,
            },
        )
    }

    #[test]
    fn append_keeps_halves_in_step() {
        let mut ledger = EventLedger::new();
        let (movement, state) = pair("10");
        ledger.append(movement, state).unwrap();
        let (movement, state) = pair("11");
        ledger.append(movement, state).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_status().unwrap().status, "11");
        assert_eq!(ledger.last_transmittal().unwrap().direction, "01");
    }

    #[test]
    fn append_rejects_mismatched_ids() {
        let mut ledger = EventLedger::new();
        let (movement, _) = pair("10");
        let (_, state) = pair("10");
        let err = ledger.append(movement, state).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn from_parts_rejects_uneven_halves() {
        let (movement, state) = pair("10");
        let err = EventLedger::from_parts(vec![movement], vec![state.clone(), state]).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[test]
    fn from_parts_rejects_out_of_step_ids() {
        let (a_movement, a_state) = pair("10");
        let (b_movement, b_state) = pair("11");
        let err = EventLedger::from_parts(
            vec![a_movement, b_movement],
            vec![b_state, a_state],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[test]
    fn first_event_id_tracks_the_oldest_exchange() {
        let mut ledger = EventLedger::new();
        assert!(ledger.first_event_id().is_none());

        let (movement, state) = pair("10");
        let first = state.event_id.clone();
        ledger.append(movement, state).unwrap();
        let (movement, state) = pair("11");
        let second = state.event_id.clone();
        ledger.append(movement, state).unwrap();

        assert_eq!(ledger.first_event_id(), Some(&first));
        assert!(ledger.contains(&second));
        assert!(!ledger.contains(&EventId::generate()));
    }

    #[test]
    fn unknown_stored_codes_still_render() {
        let event_id = EventId::generate();
        let state = StatusEvent {
            event_id: event_id.clone(),
            status: "77".into(),
            result_code: None,
            reply_code: None,
            recorded_at: now_rfc3339(),
        };
        assert_eq!(state.status_label(), "Unknown (77)");
    }
}
