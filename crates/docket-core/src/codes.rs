//! Workflow code tables.
//!
//! Codes travel as short fixed strings on disk and on the wire; the enums
//! here are the write-side vocabulary. Writes must parse into an enum and
//! fail on anything unknown. Reads keep the raw stored string and resolve a
//! display label through the `*_label_for` helpers, which never fail: a code
//! this build does not know renders as `Unknown (..)` instead of breaking a
//! report over historical data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Status ──────────────────────────────────────────────────────────────────

/// Where a revision sits in the review loop.
///
/// `00` doubles as the sentinel for "no revision received yet"; it can also
/// be stored explicitly when a submission is logged as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusCode {
    NotReceived,
    Received,
    InternalReviewed,
    SentToClient,
    ClientReviewed,
    ReturnedToVendor,
}

impl StatusCode {
    pub const ALL: [StatusCode; 6] = [
        StatusCode::NotReceived,
        StatusCode::Received,
        StatusCode::InternalReviewed,
        StatusCode::SentToClient,
        StatusCode::ClientReviewed,
        StatusCode::ReturnedToVendor,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            StatusCode::NotReceived => "00",
            StatusCode::Received => "10",
            StatusCode::InternalReviewed => "11",
            StatusCode::SentToClient => "20",
            StatusCode::ClientReviewed => "21",
            StatusCode::ReturnedToVendor => "30",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StatusCode::NotReceived => "Not Received",
            StatusCode::Received => "Received",
            StatusCode::InternalReviewed => "Internal Reviewed",
            StatusCode::SentToClient => "Sent to Client",
            StatusCode::ClientReviewed => "Client Reviewed",
            StatusCode::ReturnedToVendor => "Returned to Vendor",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| Error::validation(format!("unknown status code: {code}")))
    }
}

// ── Direction ───────────────────────────────────────────────────────────────

/// Which way a document moved in one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DirectionCode {
    VendorToInternal,
    InternalToClient,
    ClientToInternal,
    InternalToVendor,
}

impl DirectionCode {
    pub const ALL: [DirectionCode; 4] = [
        DirectionCode::VendorToInternal,
        DirectionCode::InternalToClient,
        DirectionCode::ClientToInternal,
        DirectionCode::InternalToVendor,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            DirectionCode::VendorToInternal => "01",
            DirectionCode::InternalToClient => "02",
            DirectionCode::ClientToInternal => "03",
            DirectionCode::InternalToVendor => "04",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DirectionCode::VendorToInternal => "Vendor to Internal",
            DirectionCode::InternalToClient => "Internal to Client",
            DirectionCode::ClientToInternal => "Client to Internal",
            DirectionCode::InternalToVendor => "Internal to Vendor",
        }
    }

    /// A client return carries the review outcome.
    #[must_use]
    pub const fn requires_result(self) -> bool {
        matches!(self, DirectionCode::ClientToInternal)
    }

    /// A return to the vendor carries the instruction to the vendor.
    #[must_use]
    pub const fn requires_reply(self) -> bool {
        matches!(self, DirectionCode::InternalToVendor)
    }

    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.code() == code)
            .ok_or_else(|| Error::validation(format!("unknown direction code: {code}")))
    }
}

// ── Review outcome and vendor instruction ───────────────────────────────────

/// Outcome of a completed client review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResultCode {
    Approved,
    ApprovedWithComments,
    ReviseAndResubmit,
    Rejected,
}

impl ResultCode {
    pub const ALL: [ResultCode; 4] = [
        ResultCode::Approved,
        ResultCode::ApprovedWithComments,
        ResultCode::ReviseAndResubmit,
        ResultCode::Rejected,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            ResultCode::Approved => "01",
            ResultCode::ApprovedWithComments => "02",
            ResultCode::ReviseAndResubmit => "03",
            ResultCode::Rejected => "04",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ResultCode::Approved => "Approved",
            ResultCode::ApprovedWithComments => "Approved with Comments",
            ResultCode::ReviseAndResubmit => "Revise and Resubmit",
            ResultCode::Rejected => "Rejected",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| Error::validation(format!("unknown result code: {code}")))
    }
}

/// Instruction returned to the vendor alongside a reviewed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReplyCode {
    Proceed,
    IncorporateComments,
    Resubmit,
}

impl ReplyCode {
    pub const ALL: [ReplyCode; 3] = [
        ReplyCode::Proceed,
        ReplyCode::IncorporateComments,
        ReplyCode::Resubmit,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            ReplyCode::Proceed => "01",
            ReplyCode::IncorporateComments => "02",
            ReplyCode::Resubmit => "03",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ReplyCode::Proceed => "Proceed",
            ReplyCode::IncorporateComments => "Incorporate Comments",
            ReplyCode::Resubmit => "Resubmit",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| Error::validation(format!("unknown reply code: {code}")))
    }
}

// ── Correspondence and parties ──────────────────────────────────────────────

/// Kind of an outbound correspondence record. The tag appears in generated
/// reference numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CorrespondenceKind {
    Transmittal,
    Letter,
}

impl CorrespondenceKind {
    pub const ALL: [CorrespondenceKind; 2] =
        [CorrespondenceKind::Transmittal, CorrespondenceKind::Letter];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            CorrespondenceKind::Transmittal => "T",
            CorrespondenceKind::Letter => "L",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            CorrespondenceKind::Transmittal => "Transmittal",
            CorrespondenceKind::Letter => "Letter",
        }
    }

    pub fn parse(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.tag() == tag)
            .ok_or_else(|| Error::validation(format!("unknown correspondence kind: {tag}")))
    }
}

/// Party slot used when resolving numbering codes against a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PartyRole {
    Contractor,
    Client,
}

impl PartyRole {
    pub const ALL: [PartyRole; 2] = [PartyRole::Contractor, PartyRole::Client];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            PartyRole::Contractor => "01",
            PartyRole::Client => "02",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PartyRole::Contractor => "Contractor",
            PartyRole::Client => "Client",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| Error::validation(format!("unknown party role: {code}")))
    }
}

// ── Read-side label fallbacks ───────────────────────────────────────────────

/// Label for a stored status code, tolerant of drift.
#[must_use]
pub fn status_label_for(code: &str) -> String {
    match StatusCode::parse(code) {
        Ok(status) => status.label().to_string(),
        Err(_) => format!("Unknown ({code})"),
    }
}

/// Label for a stored direction code, tolerant of drift.
#[must_use]
pub fn direction_label_for(code: &str) -> String {
    match DirectionCode::parse(code) {
        Ok(direction) => direction.label().to_string(),
        Err(_) => format!("Unknown ({code})"),
    }
}

/// Label for a stored correspondence kind tag, tolerant of drift.
#[must_use]
pub fn kind_label_for(tag: &str) -> String {
    match CorrespondenceKind::parse(tag) {
        Ok(kind) => kind.label().to_string(),
        Err(_) => format!("Unknown ({tag})"),
    }
}

macro_rules! code_serde {
    ($name:ident, $to:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.$to())
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.$to().to_string()
            }
        }
    };
}

code_serde!(StatusCode, code);
code_serde!(DirectionCode, code);
code_serde!(ResultCode, code);
code_serde!(ReplyCode, code);
code_serde!(CorrespondenceKind, tag);
code_serde!(PartyRole, code);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in StatusCode::ALL {
            assert_eq!(StatusCode::parse(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_codes_are_rejected_on_parse() {
        assert!(StatusCode::parse("99").is_err());
        assert!(DirectionCode::parse("07").is_err());
        assert!(ResultCode::parse("0").is_err());
        assert!(ReplyCode::parse("").is_err());
        assert!(CorrespondenceKind::parse("X").is_err());
        assert!(PartyRole::parse("03").is_err());
    }

    #[test]
    fn direction_requirements() {
        assert!(DirectionCode::ClientToInternal.requires_result());
        assert!(!DirectionCode::ClientToInternal.requires_reply());
        assert!(DirectionCode::InternalToVendor.requires_reply());
        assert!(!DirectionCode::VendorToInternal.requires_result());
        assert!(!DirectionCode::InternalToClient.requires_reply());
    }

    #[test]
    fn labels_fall_back_for_unknown_codes() {
        assert_eq!(status_label_for("21"), "Client Reviewed");
        assert_eq!(status_label_for("77"), "Unknown (77)");
        assert_eq!(direction_label_for("04"), "Internal to Vendor");
        assert_eq!(direction_label_for("9"), "Unknown (9)");
        assert_eq!(kind_label_for("L"), "Letter");
        assert_eq!(kind_label_for("Z"), "Unknown (Z)");
    }

    #[test]
    fn serde_uses_the_stored_code() {
        let json = serde_json::to_string(&StatusCode::SentToClient).unwrap();
        assert_eq!(json, "\"20\"");
        let back: StatusCode = serde_json::from_str("\"30\"").unwrap();
        assert_eq!(back, StatusCode::ReturnedToVendor);
        assert!(serde_json::from_str::<StatusCode>("\"98\"").is_err());

        let kind = serde_json::to_string(&CorrespondenceKind::Transmittal).unwrap();
        assert_eq!(kind, "\"T\"");
    }

    #[test]
    fn not_received_sentinel_code() {
        assert_eq!(StatusCode::NotReceived.code(), "00");
        assert_eq!(status_label_for("00"), "Not Received");
    }
}
