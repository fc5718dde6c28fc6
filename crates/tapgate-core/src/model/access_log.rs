//! Append-only access log
//!
//! The access log is the sole source of historical state: the current
//! enter/exit toggle for a (reader, card) pair is always derived from
//! the most recent ENTER/EXIT entry, never cached elsewhere. Entries
//! are never mutated or deleted, and exactly one entry is written per
//! tag event regardless of which branch the decision engine took.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of a tag event in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    Enter,
    Exit,
    Denied,
    Unknown,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Enter => "ENTER",
            LogType::Exit => "EXIT",
            LogType::Denied => "DENIED",
            LogType::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ENTER" => Some(LogType::Enter),
            "EXIT" => Some(LogType::Exit),
            "DENIED" => Some(LogType::Denied),
            "UNKNOWN" => Some(LogType::Unknown),
            _ => None,
        }
    }

    /// Whether this entry participates in toggle-state resolution
    pub fn is_transition(&self) -> bool {
        matches!(self, LogType::Enter | LogType::Exit)
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate classification of the device-control fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlResult {
    /// Every dispatched command succeeded (non-empty batch)
    Success,
    /// Every dispatched command failed (non-empty batch)
    Fail,
    /// Mixed outcomes
    Partial,
    /// Nothing to dispatch; no device calls were made
    Skipped,
}

impl ControlResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlResult::Success => "SUCCESS",
            ControlResult::Fail => "FAIL",
            ControlResult::Partial => "PARTIAL",
            ControlResult::Skipped => "SKIPPED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(ControlResult::Success),
            "FAIL" => Some(ControlResult::Fail),
            "PARTIAL" => Some(ControlResult::Partial),
            "SKIPPED" => Some(ControlResult::Skipped),
            _ => None,
        }
    }
}

impl fmt::Display for ControlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted audit record for one tag event
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLogEntry {
    /// Primary key
    pub seq: i64,

    /// Reader the tag event arrived at
    pub reader_seq: i64,

    /// Resolved card; null for UNKNOWN events
    pub card_seq: Option<i64>,

    /// Owning user of the resolved card; null for UNKNOWN events
    pub user_seq: Option<i64>,

    /// Space the reader is installed in
    pub space_seq: i64,

    /// Terminal classification
    pub log_type: LogType,

    /// Raw tag identifier as presented
    pub tag_identifier: String,

    /// Raw AID as presented, if any
    pub tag_aid: Option<String>,

    /// Aggregate control result; null when no dispatch was attempted
    pub control_result: Option<ControlResult>,

    /// Serialized per-device outcome array (JSON); audit-store only,
    /// never surfaced in the tag response
    pub control_detail: Option<String>,

    /// Tag timestamp
    pub tagged_at: DateTime<Utc>,
}

/// An audit record about to be appended
///
/// The store assigns the sequence and timestamp on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccessLogEntry {
    pub reader_seq: i64,
    pub card_seq: Option<i64>,
    pub user_seq: Option<i64>,
    pub space_seq: i64,
    pub log_type: LogType,
    pub tag_identifier: String,
    pub tag_aid: Option<String>,
    pub control_result: Option<ControlResult>,
    pub control_detail: Option<String>,
}

impl NewAccessLogEntry {
    /// Entry for an unregistered tag identifier: no card or user reference
    pub fn unknown(
        reader_seq: i64,
        space_seq: i64,
        tag_identifier: String,
        tag_aid: Option<String>,
    ) -> Self {
        Self {
            reader_seq,
            card_seq: None,
            user_seq: None,
            space_seq,
            log_type: LogType::Unknown,
            tag_identifier,
            tag_aid,
            control_result: None,
            control_detail: None,
        }
    }

    /// Entry for a denied tag event with a resolved card
    pub fn denied(
        reader_seq: i64,
        space_seq: i64,
        card_seq: i64,
        user_seq: i64,
        tag_identifier: String,
        tag_aid: Option<String>,
    ) -> Self {
        Self {
            reader_seq,
            card_seq: Some(card_seq),
            user_seq: Some(user_seq),
            space_seq,
            log_type: LogType::Denied,
            tag_identifier,
            tag_aid,
            control_result: None,
            control_detail: None,
        }
    }
}

impl fmt::Display for AccessLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AccessLogEntry({}, reader={}, type={})",
            self.seq, self.reader_seq, self.log_type
        )
    }
}
