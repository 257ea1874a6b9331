//! Strongly-typed record identifiers.
//!
//! Every record kind gets its own id type so the compiler rejects a revision
//! id where a transmittal id is expected. On the wire and in the database an
//! id is a short kind prefix, an underscore, and a lowercase 26-character
//! ULID, e.g. `rev_01hv4d3k9w5q8zrxf2c6t0mjap`. The ULID tail keeps ids of
//! one kind sortable by creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

const SUFFIX_LEN: usize = 26;

/// Crockford base32, the ULID alphabet. I, L, O, and U are excluded.
fn is_suffix_char(c: char) -> bool {
    matches!(c,
        '0'..='9'
        | 'a'..='h' | 'j' | 'k' | 'm' | 'n' | 'p'..='t' | 'v'..='z'
        | 'A'..='H' | 'J' | 'K' | 'M' | 'N' | 'P'..='T' | 'V'..='Z')
}

fn new_suffix() -> String {
    Ulid::new().to_string().to_lowercase()
}

fn check(value: &str, prefix: &'static str, kind: &'static str) -> Result<()> {
    let suffix = value
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or_else(|| {
            Error::validation(format!("{kind} id must start with `{prefix}_`: {value}"))
        })?;
    if suffix.len() != SUFFIX_LEN || !suffix.chars().all(is_suffix_char) {
        return Err(Error::validation(format!(
            "{kind} id must end in a 26-character ULID: {value}"
        )));
    }
    Ok(())
}

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Mints a fresh identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), new_suffix()))
            }

            /// Parses and validates an identifier string.
            pub fn parse(value: &str) -> Result<Self> {
                check(value, $prefix, $kind)?;
                Ok(Self(value.to_string()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                check(&value, $prefix, $kind)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Identifier of a project, the numbering and correspondence scope.
    ProjectId, "prj", "project"
);
record_id!(
    /// Identifier of a vendor document index (the register).
    DocumentIndexId, "idx", "index"
);
record_id!(
    /// Identifier of a register entry (one planned document).
    EntryId, "ent", "entry"
);
record_id!(
    /// Identifier of a received document revision.
    RevisionId, "rev", "revision"
);
record_id!(
    /// Identifier of a transmittal batch.
    TransmittalId, "txm", "transmittal"
);
record_id!(
    /// Identifier of a correspondence record.
    CorrespondenceId, "cor", "correspondence"
);
record_id!(
    /// Identifier of one appended ledger exchange.
    EventId, "evt", "event"
);
