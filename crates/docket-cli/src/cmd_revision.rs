use std::path::Path;

use docket_core::id::RevisionId;
use docket_core::ledger::EventLedger;

use crate::db;

pub fn show(db_path: &Path, revision: &str, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: RevisionId = revision.parse()?;
    let revision = store.get_revision(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&revision)?);
        return Ok(());
    }

    println!("Revision {} of {}", revision.revision_label, revision.id);
    println!("  entry    {}", revision.entry_id);
    println!("  vendor   {}", revision.vendor_ref);
    if let Some(category) = &revision.category_ref {
        println!("  category {category}");
    }
    println!("  created  {}", revision.created_at);
    if revision.removed.is_removed() {
        let reason = revision.removed.reason.as_deref().unwrap_or("");
        println!("  removed  {reason}");
    }
    if revision.is_held() {
        println!("  on hold");
    }

    for hold in &revision.holds {
        let ended = hold
            .ended_at
            .as_deref()
            .map(short_ts)
            .unwrap_or_else(|| "open".to_string());
        println!(
            "  hold [{} .. {}] {}",
            short_ts(&hold.started_at),
            ended,
            hold.reason
        );
    }

    if revision.ledger.is_empty() {
        println!("  no ledger events");
    } else {
        println!("  ledger   {} steps", revision.ledger.len());
        print_ledger(&revision.ledger);
    }
    Ok(())
}

pub fn remove(db_path: &Path, revision: &str, reason: &str) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: RevisionId = revision.parse()?;
    let revision = docket_flow::remove_revision(&store, &id, reason)?;
    println!(
        "Retired revision {} of {} ({} ledger events kept)",
        revision.revision_label,
        revision.id,
        revision.ledger.len()
    );
    Ok(())
}

/// One line per exchange: timestamp, movement, resulting state, carrier ref,
/// event id.
pub(crate) fn print_ledger(ledger: &EventLedger) {
    for (movement, state) in ledger
        .transmittal_events()
        .iter()
        .zip(ledger.status_events())
    {
        let mut extras = String::new();
        if let Some(result) = &state.result_code {
            extras.push_str(&format!("  result={result}"));
        }
        if let Some(reply) = &state.reply_code {
            extras.push_str(&format!("  reply={reply}"));
        }
        println!(
            "  [{}] {} {:<20} {} {:<18} {:<14} {}{extras}",
            short_ts(&movement.recorded_at),
            movement.direction,
            movement.direction_label(),
            state.status,
            state.status_label(),
            movement.correspondence_ref,
            state.event_id,
        );
    }
}

// "2026-08-20T09:15:00Z" -> "2026-08-20 09:15"
pub(crate) fn short_ts(ts: &str) -> String {
    match (ts.get(..10), ts.get(11..16)) {
        (Some(date), Some(time)) => format!("{date} {time}"),
        _ => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ts_trims_rfc3339() {
        assert_eq!(short_ts("2026-08-20T09:15:00Z"), "2026-08-20 09:15");
        assert_eq!(short_ts("2026-08-20"), "2026-08-20");
    }

    #[test]
    fn short_ts_passes_odd_strings_through() {
        // A multi-byte char across the slice boundary must not panic.
        assert_eq!(short_ts("2026-08-20Ω09:15:00"), "2026-08-20Ω09:15:00");
        assert_eq!(short_ts(""), "");
    }
}
