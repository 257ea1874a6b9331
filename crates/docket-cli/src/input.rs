//! Reading planned- and received-document CSV files and shaping batch
//! rejections for the terminal.

use std::path::Path;

use anyhow::Context;
use docket_core::error::Error;
use docket_flow::{PlannedRow, ReceivedRow};

/// Reads a planned-documents file. Header row:
/// `document_number,document_title,category_ref,target_date`, the last two
/// optional.
pub fn planned_rows(path: &Path) -> anyhow::Result<Vec<PlannedRow>> {
    read_rows(path)
}

/// Reads a received-documents file. Header row:
/// `document_number,document_title,revision_label`.
pub fn received_rows(path: &Path) -> anyhow::Result<Vec<ReceivedRow>> {
    read_rows(path)
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.with_context(|| format!("bad row in {}", path.display()))?);
    }
    Ok(rows)
}

/// Expands a rejected batch into one line per failing row; other errors
/// pass through unchanged.
pub fn batch_error(err: Error) -> anyhow::Error {
    match err {
        Error::PartialFailure { failures } => {
            let mut message = format!("batch rejected: {} row(s) failed", failures.len());
            for failure in &failures {
                message.push_str("\n  ");
                message.push_str(&failure.to_string());
            }
            anyhow::anyhow!(message)
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::error::{FailureReason, RowFailure};
    use std::io::Write;

    #[test]
    fn planned_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planned.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "document_number,document_title,category_ref,target_date").unwrap();
        writeln!(file, "VP-001,Pump Datasheet,DS,2026-09-01").unwrap();
        writeln!(file, "VP-002,Pump GA Drawing,,").unwrap();
        drop(file);

        let rows = planned_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].document_number, "VP-001");
        assert_eq!(rows[0].target_date.as_deref(), Some("2026-09-01"));
        assert_eq!(rows[1].category_ref, None);
        assert_eq!(rows[1].target_date, None);
    }

    #[test]
    fn received_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("received.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "document_number,document_title,revision_label").unwrap();
        writeln!(file, "VP-001,Pump Datasheet,A").unwrap();
        drop(file);

        let rows = received_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].revision_label, "A");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = planned_rows(Path::new("/nonexistent/planned.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/planned.csv"));
    }

    #[test]
    fn batch_error_lists_every_row() {
        let err = batch_error(Error::partial(vec![
            RowFailure {
                document_number: "VP-009".into(),
                revision_label: None,
                reason: FailureReason::UnknownDocument,
            },
            RowFailure {
                document_number: "VP-001".into(),
                revision_label: Some("A".into()),
                reason: FailureReason::DuplicateRevision,
            },
        ]));
        let text = format!("{err}");
        assert!(text.contains("2 row(s) failed"));
        assert!(text.contains("VP-009: unknown document number"));
        assert!(text.contains("VP-001 rev A: duplicate revision label"));
    }
}
