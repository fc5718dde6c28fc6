//! Reader domain model
//!
//! A reader is the wall-mounted NFC terminal a credential is presented
//! to. A reader is installed in exactly one space for its lifetime and
//! authenticates itself with an opaque API key.

use chrono::{DateTime, Utc};
use std::fmt;
use tapgate_core_types::Sensitive;

/// Lifecycle status of a reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStatus {
    Active,
    Inactive,
}

impl ReaderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReaderStatus::Active => "ACTIVE",
            ReaderStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ReaderStatus::Active),
            "INACTIVE" => Some(ReaderStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for ReaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered reader terminal
#[derive(Debug, Clone)]
pub struct Reader {
    /// Primary key
    pub seq: i64,

    /// The space this reader is installed in
    pub space_seq: i64,

    /// Display name
    pub name: String,

    /// Unique short code
    pub code: String,

    /// Hardware serial, if recorded
    pub serial: Option<String>,

    /// Bearer credential presented by the reader agent; redacted in logs
    pub api_key: Sensitive<String>,

    /// Lifecycle status
    pub status: ReaderStatus,

    /// Soft-delete flag
    pub deleted: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// The resolved reader identity a tag event is processed under
///
/// Produced by API-key resolution at the boundary and threaded through
/// the decision engine; carries only what the decision needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderContext {
    pub reader_seq: i64,
    pub space_seq: i64,
    pub name: String,
    pub code: String,
}

impl fmt::Display for ReaderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reader({}, code={})", self.reader_seq, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [ReaderStatus::Active, ReaderStatus::Inactive] {
            assert_eq!(ReaderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReaderStatus::parse(""), None);
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let reader = Reader {
            seq: 1,
            space_seq: 2,
            name: "Lobby East".to_string(),
            code: "RD-001".to_string(),
            serial: None,
            api_key: Sensitive::new("rk_live_secret".to_string()),
            status: ReaderStatus::Active,
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let debug_str = format!("{:?}", reader);
        assert!(!debug_str.contains("rk_live_secret"));
        assert!(debug_str.contains("***REDACTED***"));
    }
}
