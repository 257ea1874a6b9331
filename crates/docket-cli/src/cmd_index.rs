use std::path::Path;

use docket_core::id::DocumentIndexId;
use docket_flow::{AttachTarget, EntryDelete, EntryUpsert};

use crate::{db, input};

pub struct EditParams<'a> {
    pub db_path: &'a Path,
    pub index: &'a str,
    pub entry: Option<&'a str>,
    pub title: Option<&'a str>,
    pub category: Option<&'a str>,
    pub target: Option<&'a str>,
    pub add: Option<&'a Path>,
    pub removes: &'a [String],
    pub reason: Option<&'a str>,
}

pub fn create(db_path: &Path, vendor: &str, file: &Path, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let rows = input::planned_rows(file)?;
    let index = docket_flow::create_index(&store, vendor, &rows)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }
    println!("Opened register {} for {}", index.id, index.vendor_ref);
    println!("  {} entries", index.entries.len());
    Ok(())
}

pub fn import(db_path: &Path, index: &str, file: &Path) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let index_id: DocumentIndexId = index.parse()?;
    let rows = input::planned_rows(file)?;
    let index = docket_flow::import_entries(&store, &index_id, &rows)?;
    println!("Imported {} entries into {}", rows.len(), index.id);
    println!("  {} entries total", index.entries.len());
    Ok(())
}

pub fn edit(params: &EditParams<'_>) -> anyhow::Result<()> {
    let store = db::open(params.db_path)?;
    let index_id: DocumentIndexId = params.index.parse()?;

    let mut upserts = Vec::new();
    match (params.entry, params.title) {
        (Some(entry), Some(title)) => upserts.push(EntryUpsert {
            id: Some(entry.parse()?),
            document_number: None,
            document_title: title.to_string(),
            category_ref: params.category.map(str::to_string),
            target_date: params.target.map(str::to_string),
        }),
        (Some(_), None) => anyhow::bail!("--entry needs --title"),
        (None, Some(_)) => anyhow::bail!("--title needs --entry"),
        (None, None) => {}
    }
    if let Some(file) = params.add {
        for row in input::planned_rows(file)? {
            upserts.push(EntryUpsert {
                id: None,
                document_number: Some(row.document_number),
                document_title: row.document_title,
                category_ref: row.category_ref,
                target_date: row.target_date,
            });
        }
    }

    let mut deletes = Vec::new();
    for raw in params.removes {
        deletes.push(EntryDelete {
            id: raw.parse()?,
            reason: params.reason.map(str::to_string),
        });
    }

    if upserts.is_empty() && deletes.is_empty() {
        anyhow::bail!("nothing to edit: pass --entry with --title, --add, or --remove");
    }

    let index = docket_flow::edit_entries(&store, &index_id, &upserts, &deletes)?;
    println!(
        "Edited register {}: {} entries active",
        index.id,
        index.entries.len()
    );
    Ok(())
}

pub fn receive(db_path: &Path, index: &str, file: &Path) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let index_id: DocumentIndexId = index.parse()?;
    let rows = input::received_rows(file)?;
    let ids = docket_flow::attach_revisions(&store, &AttachTarget::Index(index_id), &rows)
        .map_err(input::batch_error)?;

    println!("Attached {} revisions", ids.len());
    for id in &ids {
        println!("  {id}");
    }
    Ok(())
}

pub fn remove(db_path: &Path, index: &str, reason: &str) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let index_id: DocumentIndexId = index.parse()?;
    let index = docket_flow::remove_index(&store, &index_id, reason)?;
    println!("Retired register {} ({})", index.id, index.vendor_ref);
    Ok(())
}

pub fn list(db_path: &Path, page: u32, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let listing = docket_report::list_indexes(&store, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.items.is_empty() {
        println!("No registers.");
        return Ok(());
    }
    for summary in &listing.items {
        println!(
            "{}  {:<20}  {:>4} entries  {}",
            summary.id, summary.vendor_ref, summary.entry_count, summary.created_at
        );
    }
    println!(
        "\npage {} of {} ({} registers)",
        listing.page,
        listing.total_pages(),
        listing.total_items
    );
    Ok(())
}
