use std::path::Path;

use docket_core::id::EventId;
use docket_flow::Advanced;

use crate::{cmd_advance, db};

pub fn execute(
    db_path: &Path,
    transmittal: Option<&str>,
    revision: Option<&str>,
    event: &str,
) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let target = cmd_advance::resolve_target(transmittal, revision)?;
    let event_id: EventId = event.parse()?;

    let (kind, id, events_left, kept) = match docket_flow::retract(&store, &target, &event_id)? {
        Advanced::Revision(revision) => (
            "revision",
            revision.id.to_string(),
            revision.ledger.len(),
            revision.ledger.contains(&event_id),
        ),
        Advanced::Transmittal(transmittal) => (
            "transmittal",
            transmittal.id.to_string(),
            transmittal.ledger.len(),
            transmittal.ledger.contains(&event_id),
        ),
    };

    if kept {
        println!("Nothing retracted: {event_id} is the opening step of {kind} {id}");
    } else {
        println!("Retracted {event_id} from {kind} {id} ({events_left} events left)");
    }
    Ok(())
}
