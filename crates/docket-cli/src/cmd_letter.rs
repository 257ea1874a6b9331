use std::path::Path;

use docket_core::codes::{CorrespondenceKind, PartyRole};
use docket_core::id::{CorrespondenceId, ProjectId};
use docket_flow::NewCorrespondence;

use crate::db;

pub struct FileParams<'a> {
    pub db_path: &'a Path,
    pub project: &'a str,
    pub kind: &'a str,
    pub sender: &'a str,
    pub receiver: &'a str,
    pub links: Vec<String>,
    pub reference: Option<&'a str>,
    pub sent: Option<&'a str>,
    pub reply_by: Option<&'a str>,
    pub json: bool,
}

/// Prints the issued ref alone so it can be captured by scripts.
pub fn number(
    db_path: &Path,
    project: &str,
    kind: &str,
    sender: &str,
    receiver: &str,
) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let project_id: ProjectId = project.parse()?;
    let reference = docket_flow::next_correspondence_ref(
        &store,
        &project_id,
        CorrespondenceKind::parse(kind)?,
        PartyRole::parse(sender)?,
        PartyRole::parse(receiver)?,
    )?;
    println!("{reference}");
    Ok(())
}

pub fn file(params: &FileParams<'_>) -> anyhow::Result<()> {
    let store = db::open(params.db_path)?;
    let project_id: ProjectId = params.project.parse()?;
    let new = NewCorrespondence {
        kind: CorrespondenceKind::parse(params.kind)?,
        sender: PartyRole::parse(params.sender)?,
        receiver: PartyRole::parse(params.receiver)?,
        links: params.links.clone(),
        correspondence_ref: params.reference.map(str::to_string),
        send_date: params.sent.map(str::to_string),
        target_reply_date: params.reply_by.map(str::to_string),
    };
    let letter = docket_flow::create_correspondence(&store, &project_id, &new)?;

    if params.json {
        println!("{}", serde_json::to_string_pretty(&letter)?);
        return Ok(());
    }
    println!("Filed {} {}", letter.kind_label(), letter.correspondence_ref);
    println!("  id {}", letter.id);
    if !letter.links.is_empty() {
        println!("  about {}", letter.links.join(", "));
    }
    if let Some(due) = &letter.target_reply_date {
        println!("  reply expected by {due}");
    }
    Ok(())
}

pub fn reply(db_path: &Path, letter: &str, date: &str) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: CorrespondenceId = letter.parse()?;
    let letter = docket_flow::mark_reply_received(&store, &id, date)?;
    println!("Recorded reply to {} on {date}", letter.correspondence_ref);
    Ok(())
}

pub fn cancel(db_path: &Path, letter: &str, reason: &str) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: CorrespondenceId = letter.parse()?;
    let letter = docket_flow::cancel_correspondence(&store, &id, reason)?;
    println!("Canceled {} {}", letter.kind_label(), letter.correspondence_ref);
    Ok(())
}

pub fn list(db_path: &Path, project: Option<&str>, page: u32, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let project_id = project.map(str::parse::<ProjectId>).transpose()?;
    let listing = docket_report::list_correspondence(&store, project_id.as_ref(), page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.items.is_empty() {
        println!("No correspondence on file.");
        return Ok(());
    }
    for letter in &listing.items {
        let sent = letter.send_date.as_deref().unwrap_or("-");
        let reply = match (&letter.reply_received, &letter.target_reply_date) {
            (Some(date), _) => format!("replied {date}"),
            (None, Some(due)) => format!("reply due {due}"),
            (None, None) => "no reply expected".to_string(),
        };
        println!(
            "{}  {:<14}  {:<11}  sent {:<10}  {}",
            letter.id,
            letter.correspondence_ref,
            letter.kind_label(),
            sent,
            reply
        );
    }
    println!(
        "\npage {} of {} ({} letters)",
        listing.page,
        listing.total_pages(),
        listing.total_items
    );
    Ok(())
}

pub fn overdue(db_path: &Path, project: &str, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let project_id: ProjectId = project.parse()?;
    let letters = docket_report::overdue_correspondence(&store, &project_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&letters)?);
        return Ok(());
    }
    if letters.is_empty() {
        println!("No overdue replies.");
        return Ok(());
    }
    for letter in &letters {
        let due = letter.target_reply_date.as_deref().unwrap_or("");
        println!(
            "{}  {:<14}  reply was due {due}",
            letter.id, letter.correspondence_ref
        );
    }
    println!("\n({} letters awaiting replies)", letters.len());
    Ok(())
}
