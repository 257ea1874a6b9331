//! Timestamp and calendar-date helpers.
//!
//! All timestamps are RFC 3339 strings in UTC and all calendar dates are
//! `YYYY-MM-DD` strings. Both sort correctly under plain string comparison,
//! which the reporting queries rely on.

use std::sync::OnceLock;

use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::OffsetDateTime;

use crate::error::{Error, Result};

fn date_format() -> &'static [FormatItem<'static>] {
    static FORMAT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FORMAT.get_or_init(|| {
        time::format_description::parse("[year]-[month]-[day]")
            .expect("date format description is valid")
    })
}

/// Current UTC instant as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

/// Current UTC calendar date as a `YYYY-MM-DD` string.
pub fn today() -> String {
    let now = OffsetDateTime::now_utc();
    now.date()
        .format(date_format())
        .expect("date formatting should not fail")
}

/// Validate a caller-supplied RFC 3339 timestamp.
pub fn validate_timestamp(value: &str) -> Result<()> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|_| ())
        .map_err(|_| Error::validation(format!("invalid RFC 3339 timestamp: {value}")))
}

/// Validate a caller-supplied `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> Result<()> {
    time::Date::parse(value, date_format())
        .map(|_| ())
        .map_err(|_| Error::validation(format!("invalid date (expected YYYY-MM-DD): {value}")))
}
