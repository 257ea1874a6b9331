//! Locating and opening the docket database for CLI commands.

use std::path::{Path, PathBuf};

use docket_core::error::Error;
use docket_store::SqliteStore;

/// Resolves the database path: `--db` wins, then `DOCKET_DB`, then
/// `./docket.db`.
pub fn resolve_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("DOCKET_DB").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("docket.db"))
}

/// Opens an existing database, pointing the user at `docket init` when
/// there is none.
pub fn open(path: &Path) -> anyhow::Result<SqliteStore> {
    match SqliteStore::open(path) {
        Err(Error::NotFound { .. }) => anyhow::bail!(
            "no docket database at {} (run `docket init` first)",
            path.display()
        ),
        other => Ok(other?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_default() {
        let path = resolve_path(Some(PathBuf::from("/tmp/custom.db")));
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn missing_database_names_the_fix() {
        let dir = tempfile::tempdir().unwrap();
        let err = open(&dir.path().join("docket.db")).unwrap_err();
        assert!(err.to_string().contains("docket init"));
    }
}
