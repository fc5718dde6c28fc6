//! Collaborator ports consumed by the decision engine
//!
//! The engine owns no persistent state; everything it reads or writes
//! goes through these traits. The store crate implements them over
//! SQLite, and tests stub them per branch.

use crate::errors::Result;
use crate::model::{
    Card, CommandBinding, CommandType, DispatchReport, LogType, NewAccessLogEntry, PresetCommand,
    ReaderCommandMapping, Space, SpaceDevice,
};

/// Resolves a tag identifier to a registered card
pub trait CardDirectory {
    /// Find the non-deleted card with this exact identifier, if any
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Card>>;
}

/// Resolves whether a user may access a building
pub trait PermissionOracle {
    fn has_building_permission(&self, user_seq: i64, building_seq: i64) -> Result<bool>;
}

/// Resolves spaces
pub trait SpaceDirectory {
    fn find_space(&self, space_seq: i64) -> Result<Option<Space>>;
}

/// Resolves user display names for responses
pub trait UserDirectory {
    fn user_name(&self, user_seq: i64) -> Result<Option<String>>;
}

/// Supplies the data the command mapping resolver works over
pub trait MappingSource {
    /// All live (non-deleted) mappings for a reader
    fn live_mappings_for(&self, reader_seq: i64) -> Result<Vec<ReaderCommandMapping>>;

    /// All ACTIVE, non-deleted devices in a space, in display order
    fn active_devices_in(&self, space_seq: i64) -> Result<Vec<SpaceDevice>>;

    /// The non-deleted command of the given type in a preset, if any
    fn command_of_type(
        &self,
        preset_seq: i64,
        command_type: &CommandType,
    ) -> Result<Option<PresetCommand>>;
}

/// The append-only audit log
///
/// `append` must never silently drop: if the store is unavailable the
/// error propagates, since a tag event without an audit record is worse
/// than a rejected tag event.
pub trait AuditLog {
    /// Append one entry; returns the assigned sequence
    fn append(&self, entry: &NewAccessLogEntry) -> Result<i64>;

    /// The log type of the most recent ENTER/EXIT entry for the exact
    /// (reader, card) pair, if any. DENIED/UNKNOWN entries are ignored.
    fn last_transition(&self, reader_seq: i64, card_seq: i64) -> Result<Option<LogType>>;
}

/// Executes a batch of device commands and reports per-device outcomes
///
/// One batch call per tag event; the engine never retries within an
/// event. Implementations fan out internally and must bound their
/// overall latency.
pub trait DeviceDispatcher {
    fn execute(&self, batch: &[CommandBinding], acting_user_seq: i64) -> Result<DispatchReport>;
}
