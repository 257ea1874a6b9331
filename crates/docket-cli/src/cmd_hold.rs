use std::path::Path;

use docket_core::id::RevisionId;

use crate::db;

pub fn execute(db_path: &Path, revision: &str, reason: &str, release: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let id: RevisionId = revision.parse()?;
    let revision = docket_flow::hold_revision(&store, &id, !release, reason)?;

    if release {
        println!("Released hold on revision {}", revision.id);
    } else {
        println!("Put revision {} on hold: {reason}", revision.id);
    }
    Ok(())
}
