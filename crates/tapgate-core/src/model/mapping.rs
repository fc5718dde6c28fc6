//! Reader-to-device command mappings
//!
//! A mapping binds one (reader, device) pair to an optional enter
//! command and an optional exit command. A reader's mapping set is
//! either empty (default policy applies) or a curated list that
//! replaces the default policy entirely.

use crate::toggle::Direction;
use serde::{Deserialize, Serialize};

/// A stored (reader, device) command mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderCommandMapping {
    /// Primary key
    pub seq: i64,

    /// Reader this mapping belongs to
    pub reader_seq: i64,

    /// Device controlled on tag events at this reader
    pub space_device_seq: i64,

    /// Command run on ENTER; absent means "leave this device alone on enter"
    pub enter_command_seq: Option<i64>,

    /// Command run on EXIT; absent means "leave this device alone on exit"
    pub exit_command_seq: Option<i64>,
}

impl ReaderCommandMapping {
    /// Select the command for the given transition direction, if mapped
    pub fn command_for(&self, direction: Direction) -> Option<i64> {
        match direction {
            Direction::Enter => self.enter_command_seq,
            Direction::Exit => self.exit_command_seq,
        }
    }
}

/// A mapping as submitted by the administrative surface
///
/// Validated against the reader's space before any write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    pub space_device_seq: i64,
    #[serde(default)]
    pub enter_command_seq: Option<i64>,
    #[serde(default)]
    pub exit_command_seq: Option<i64>,
}
