//! Port adapter over a borrowed connection
//!
//! [`SqliteStore`] implements every collaborator trait the decision
//! engine consumes, delegating to the per-entity repositories.

use crate::repo::{CardRepo, DeviceRepo, LogRepo, MappingRepo, SpaceRepo};
use rusqlite::Connection;
use tapgate_core::errors::Result;
use tapgate_core::model::{
    Card, CommandType, LogType, NewAccessLogEntry, PresetCommand, ReaderCommandMapping, Space,
    SpaceDevice,
};
use tapgate_core::ports::{
    AuditLog, CardDirectory, MappingSource, PermissionOracle, SpaceDirectory, UserDirectory,
};

/// SQLite-backed implementation of the core's collaborator ports
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CardDirectory for SqliteStore<'_> {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Card>> {
        CardRepo::find_by_identifier(self.conn, identifier)
    }
}

impl PermissionOracle for SqliteStore<'_> {
    fn has_building_permission(&self, user_seq: i64, building_seq: i64) -> Result<bool> {
        SpaceRepo::has_building_permission(self.conn, user_seq, building_seq)
    }
}

impl SpaceDirectory for SqliteStore<'_> {
    fn find_space(&self, space_seq: i64) -> Result<Option<Space>> {
        SpaceRepo::find_space(self.conn, space_seq)
    }
}

impl UserDirectory for SqliteStore<'_> {
    fn user_name(&self, user_seq: i64) -> Result<Option<String>> {
        SpaceRepo::user_name(self.conn, user_seq)
    }
}

impl MappingSource for SqliteStore<'_> {
    fn live_mappings_for(&self, reader_seq: i64) -> Result<Vec<ReaderCommandMapping>> {
        MappingRepo::live_mappings_for(self.conn, reader_seq)
    }

    fn active_devices_in(&self, space_seq: i64) -> Result<Vec<SpaceDevice>> {
        DeviceRepo::active_devices_in(self.conn, space_seq)
    }

    fn command_of_type(
        &self,
        preset_seq: i64,
        command_type: &CommandType,
    ) -> Result<Option<PresetCommand>> {
        DeviceRepo::command_of_type(self.conn, preset_seq, command_type)
    }
}

impl AuditLog for SqliteStore<'_> {
    fn append(&self, entry: &NewAccessLogEntry) -> Result<i64> {
        LogRepo::append(self.conn, entry)
    }

    fn last_transition(&self, reader_seq: i64, card_seq: i64) -> Result<Option<LogType>> {
        LogRepo::last_transition(self.conn, reader_seq, card_seq)
    }
}
