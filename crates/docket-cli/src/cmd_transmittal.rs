use std::path::Path;

use docket_core::codes;
use docket_core::id::TransmittalId;
use docket_flow::{AttachTarget, NewTransmittal};

use crate::{db, input};

pub struct CreateParams<'a> {
    pub db_path: &'a Path,
    pub vendor: &'a str,
    pub reference: &'a str,
    pub sender: &'a str,
    pub receiver: &'a str,
    pub file: &'a Path,
    pub at: Option<&'a str>,
    pub json: bool,
}

pub fn create(params: &CreateParams<'_>) -> anyhow::Result<()> {
    let store = db::open(params.db_path)?;
    let rows = input::received_rows(params.file)?;
    let new = NewTransmittal {
        vendor_ref: params.vendor.to_string(),
        sender: params.sender.to_string(),
        receiver: params.receiver.to_string(),
        correspondence_ref: params.reference.to_string(),
        occurred_at: params.at.map(str::to_string),
    };
    let transmittal =
        docket_flow::create_transmittal(&store, &new, &rows).map_err(input::batch_error)?;

    if params.json {
        println!("{}", serde_json::to_string_pretty(&transmittal)?);
        return Ok(());
    }
    println!(
        "Registered transmittal {} ({})",
        transmittal.id, transmittal.correspondence_ref
    );
    println!(
        "  {} -> {}  {} members",
        transmittal.sender,
        transmittal.receiver,
        transmittal.members.len()
    );
    Ok(())
}

pub fn extend(db_path: &Path, transmittal: &str, file: &Path) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: TransmittalId = transmittal.parse()?;
    let rows = input::received_rows(file)?;
    let ids = docket_flow::attach_revisions(&store, &AttachTarget::Transmittal(id.clone()), &rows)
        .map_err(input::batch_error)?;

    println!("Attached {} revisions to {id}", ids.len());
    for revision_id in &ids {
        println!("  {revision_id}");
    }
    Ok(())
}

pub fn cancel(db_path: &Path, transmittal: &str, reason: &str) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: TransmittalId = transmittal.parse()?;
    let transmittal = docket_flow::cancel_transmittal(&store, &id, reason)?;
    println!(
        "Canceled transmittal {} ({})",
        transmittal.id, transmittal.correspondence_ref
    );
    Ok(())
}

pub fn list(db_path: &Path, vendor: Option<&str>, page: u32, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let listing = docket_report::list_transmittals(&store, vendor, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.items.is_empty() {
        println!("No transmittals.");
        return Ok(());
    }
    for summary in &listing.items {
        let status = summary.last_status.as_deref().unwrap_or("00");
        println!(
            "{}  {:<14}  {:<16}  {:>3} docs  {} {:<18}  {}",
            summary.id,
            summary.correspondence_ref,
            summary.vendor_ref,
            summary.member_count,
            status,
            codes::status_label_for(status),
            summary.created_at
        );
    }
    println!(
        "\npage {} of {} ({} transmittals)",
        listing.page,
        listing.total_pages(),
        listing.total_items
    );
    Ok(())
}

pub fn show(db_path: &Path, transmittal: &str, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: TransmittalId = transmittal.parse()?;
    let transmittal = store.get_transmittal(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transmittal)?);
        return Ok(());
    }

    println!("Transmittal {}", transmittal.id);
    println!("  ref      {}", transmittal.correspondence_ref);
    println!("  vendor   {}", transmittal.vendor_ref);
    println!(
        "  parties  {} -> {}",
        transmittal.sender, transmittal.receiver
    );
    println!("  created  {}", transmittal.created_at);
    if transmittal.canceled.is_removed() {
        let reason = transmittal.canceled.reason.as_deref().unwrap_or("");
        println!("  canceled {reason}");
    }

    println!("  members  {}", transmittal.members.len());
    for member in &transmittal.members {
        println!("    {member}");
    }

    if transmittal.ledger.is_empty() {
        println!("  no ledger events");
    } else {
        println!("  ledger   {} steps", transmittal.ledger.len());
        crate::cmd_revision::print_ledger(&transmittal.ledger);
    }
    Ok(())
}
