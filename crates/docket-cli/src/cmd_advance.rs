use std::path::Path;

use docket_core::codes::{DirectionCode, ReplyCode, ResultCode, StatusCode};
use docket_flow::{Advanced, AdvanceRequest, LedgerTarget};

use crate::db;

pub struct AdvanceParams<'a> {
    pub db_path: &'a Path,
    pub transmittal: Option<&'a str>,
    pub revision: Option<&'a str>,
    pub direction: &'a str,
    pub status: &'a str,
    pub reference: &'a str,
    pub result: Option<&'a str>,
    pub reply: Option<&'a str>,
    pub at: Option<&'a str>,
    pub json: bool,
}

pub fn execute(params: &AdvanceParams<'_>) -> anyhow::Result<()> {
    let store = db::open(params.db_path)?;
    let target = resolve_target(params.transmittal, params.revision)?;

    let request = AdvanceRequest {
        direction: DirectionCode::parse(params.direction)?,
        correspondence_ref: params.reference.to_string(),
        status: StatusCode::parse(params.status)?,
        result_code: params.result.map(ResultCode::parse).transpose()?,
        reply_code: params.reply.map(ReplyCode::parse).transpose()?,
        occurred_at: params.at.map(str::to_string),
    };

    match docket_flow::advance(&store, &target, &request)? {
        Advanced::Revision(revision) => {
            if params.json {
                println!("{}", serde_json::to_string_pretty(&revision)?);
                return Ok(());
            }
            let status = revision
                .current_status()
                .map(|s| s.status_label())
                .unwrap_or_default();
            println!("Advanced revision {}: now {status}", revision.id);
        }
        Advanced::Transmittal(transmittal) => {
            if params.json {
                println!("{}", serde_json::to_string_pretty(&transmittal)?);
                return Ok(());
            }
            let status = transmittal
                .current_status()
                .map(|s| s.status_label())
                .unwrap_or_default();
            println!(
                "Advanced transmittal {} and its members: now {status}",
                transmittal.id
            );
        }
    }
    Ok(())
}

/// Exactly one of the two target flags must be given.
pub(crate) fn resolve_target(
    transmittal: Option<&str>,
    revision: Option<&str>,
) -> anyhow::Result<LedgerTarget> {
    match (transmittal, revision) {
        (Some(id), None) => Ok(LedgerTarget::Transmittal(id.parse()?)),
        (None, Some(id)) => Ok(LedgerTarget::Revision(id.parse()?)),
        _ => anyhow::bail!("pass exactly one of --transmittal or --revision"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_needs_exactly_one_flag() {
        assert!(resolve_target(None, None).is_err());
        assert!(resolve_target(Some("txm_x"), Some("rev_x")).is_err());
    }

    #[test]
    fn target_rejects_mismatched_ids() {
        let err = resolve_target(Some("rev_0000000000000000000000000a"), None).unwrap_err();
        assert!(err.to_string().contains("txm_"));
    }
}
