use std::path::Path;

use docket_core::id::DocumentIndexId;

use crate::db;

pub fn overview(db_path: &Path, index: &str, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let index_id: DocumentIndexId = index.parse()?;
    let overview = docket_report::overview(&store, &index_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }
    println!("Register {index_id}");
    println!("  entries             {}", overview.entry_count);
    println!("  revisions received  {}", overview.revisions_received);
    println!("  first submissions   {}", overview.first_submission_count);
    println!("  deleted             {}", overview.deleted_count);
    println!("  held                {}", overview.held_count);
    println!("  delayed             {}", overview.delayed_count);
    Ok(())
}

pub fn breakdown(db_path: &Path, index: &str, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let index_id: DocumentIndexId = index.parse()?;
    let buckets = docket_report::status_breakdown(&store, &index_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }
    println!("Register {index_id} by current status");
    for bucket in &buckets {
        println!(
            "  {} {:<20} {:>5}",
            bucket.status_code, bucket.status_label, bucket.count
        );
    }
    Ok(())
}

pub fn drilldown(db_path: &Path, index: &str, page: u32, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let index_id: DocumentIndexId = index.parse()?;
    let listing = docket_report::drilldown(&store, &index_id, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.items.is_empty() {
        println!("No entries on this page.");
        return Ok(());
    }
    for item in &listing.items {
        let target = item.entry.target_date.as_deref().unwrap_or("-");
        println!(
            "{}  {:<30}  target {:<10}  [{} {}]  {} revisions",
            item.entry.document_number,
            item.entry.document_title,
            target,
            item.current_status_code,
            item.current_status_label,
            item.chain_length
        );
        for revision in &item.revisions {
            let status = revision
                .current_status()
                .map(|s| format!("{} {}", s.status, s.status_label()))
                .unwrap_or_else(|| "00 Not Received".to_string());
            let mut flags = String::new();
            if revision.removed.is_removed() {
                flags.push_str("  removed");
            }
            if revision.is_held() {
                flags.push_str("  on hold");
            }
            println!(
                "    rev {:<4} {:<22}  {} steps{flags}",
                revision.revision_label,
                status,
                revision.ledger.len()
            );
        }
    }
    println!(
        "\npage {} of {} ({} entries)",
        listing.page,
        listing.total_pages(),
        listing.total_items
    );
    Ok(())
}

pub fn latest(db_path: &Path, vendor: &str, page: u32, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let listing = docket_report::latest_per_entry(&store, vendor, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.items.is_empty() {
        println!("No entries on this page.");
        return Ok(());
    }
    for row in &listing.items {
        let label = row.revision_label.as_deref().unwrap_or("-");
        let movement = row.direction_label.as_deref().unwrap_or("-");
        let target = row.target_date.as_deref().unwrap_or("-");
        println!(
            "{:<12}  {:<30}  rev {:<4}  {:<20}  {} {:<18}  target {}",
            row.document_number,
            row.document_title,
            label,
            movement,
            row.status_code,
            row.status_label,
            target
        );
    }
    println!(
        "\npage {} of {} ({} entries)",
        listing.page,
        listing.total_pages(),
        listing.total_items
    );
    Ok(())
}
