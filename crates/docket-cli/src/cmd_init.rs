use std::path::Path;

use docket_store::SqliteStore;

pub fn execute(db_path: &Path) -> anyhow::Result<()> {
    let existed = db_path.exists();
    let store = SqliteStore::open_or_create(db_path)?;
    let version = store.schema_version()?;
    if existed {
        println!(
            "Already initialized at {} (schema v{version})",
            db_path.display()
        );
    } else {
        println!("Initialized {} (schema v{version})", db_path.display());
    }
    Ok(())
}
