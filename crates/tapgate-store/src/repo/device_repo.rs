//! Space device and preset command lookups

use crate::errors::{corrupt_row, from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use tapgate_core::model::{CommandType, DeviceStatus, PresetCommand, SpaceDevice};

const DEVICE_COLUMNS: &str = "space_device_seq, space_seq, preset_seq, device_name, device_ip,
                              device_port, status, device_order, deleted";

const COMMAND_COLUMNS: &str =
    "command_seq, preset_seq, command_name, command_code, command_type, command_order, deleted";

/// Read-side repository for devices and their preset commands
pub struct DeviceRepo;

impl DeviceRepo {
    /// All ACTIVE, non-deleted devices in a space, in display order
    pub fn active_devices_in(conn: &Connection, space_seq: i64) -> Result<Vec<SpaceDevice>> {
        let sql = format!(
            "SELECT {} FROM space_devices
             WHERE space_seq = ?1 AND deleted = 0 AND status = 'ACTIVE'
             ORDER BY device_order ASC, space_device_seq ASC",
            DEVICE_COLUMNS
        );
        Self::query_devices(conn, &sql, space_seq)
    }

    /// All non-deleted devices in a space regardless of status, in
    /// display order (administrative view)
    pub fn devices_in(conn: &Connection, space_seq: i64) -> Result<Vec<SpaceDevice>> {
        let sql = format!(
            "SELECT {} FROM space_devices
             WHERE space_seq = ?1 AND deleted = 0
             ORDER BY device_order ASC, space_device_seq ASC",
            DEVICE_COLUMNS
        );
        Self::query_devices(conn, &sql, space_seq)
    }

    /// Find a non-deleted device by sequence
    pub fn find_device(conn: &Connection, space_device_seq: i64) -> Result<Option<SpaceDevice>> {
        let sql = format!(
            "SELECT {} FROM space_devices WHERE space_device_seq = ?1 AND deleted = 0",
            DEVICE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let row = stmt
            .query_row([space_device_seq], raw_device)
            .optional()
            .map_err(from_rusqlite)?;
        row.map(hydrate_device).transpose()
    }

    /// The non-deleted command of the given type in a preset, if any
    pub fn command_of_type(
        conn: &Connection,
        preset_seq: i64,
        command_type: &CommandType,
    ) -> Result<Option<PresetCommand>> {
        let sql = format!(
            "SELECT {} FROM preset_commands
             WHERE preset_seq = ?1 AND command_type = ?2 AND deleted = 0
             ORDER BY command_order ASC
             LIMIT 1",
            COMMAND_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let row = stmt
            .query_row(
                rusqlite::params![preset_seq, command_type.as_str()],
                raw_command,
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(row.map(hydrate_command))
    }

    /// Find a non-deleted command by sequence
    pub fn find_command(conn: &Connection, command_seq: i64) -> Result<Option<PresetCommand>> {
        let sql = format!(
            "SELECT {} FROM preset_commands WHERE command_seq = ?1 AND deleted = 0",
            COMMAND_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let row = stmt
            .query_row([command_seq], raw_command)
            .optional()
            .map_err(from_rusqlite)?;
        Ok(row.map(hydrate_command))
    }

    /// All non-deleted commands of a preset, in display order
    pub fn commands_for_preset(conn: &Connection, preset_seq: i64) -> Result<Vec<PresetCommand>> {
        let sql = format!(
            "SELECT {} FROM preset_commands
             WHERE preset_seq = ?1 AND deleted = 0
             ORDER BY command_order ASC, command_seq ASC",
            COMMAND_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([preset_seq], raw_command)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows.into_iter().map(hydrate_command).collect())
    }

    fn query_devices(conn: &Connection, sql: &str, space_seq: i64) -> Result<Vec<SpaceDevice>> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([space_seq], raw_device)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(hydrate_device).collect()
    }
}

type RawDevice = (
    i64,
    i64,
    i64,
    String,
    Option<String>,
    Option<i64>,
    String,
    i64,
    i64,
);

fn raw_device(row: &Row<'_>) -> rusqlite::Result<RawDevice> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn hydrate_device(raw: RawDevice) -> Result<SpaceDevice> {
    let (seq, space_seq, preset_seq, name, ip, port, status, order, deleted) = raw;
    let status = DeviceStatus::parse(&status)
        .ok_or_else(|| corrupt_row("space_devices", "status", &status))?;

    Ok(SpaceDevice {
        seq,
        space_seq,
        preset_seq,
        name,
        ip,
        port: port.map(|p| p as u16),
        status,
        order,
        deleted: deleted != 0,
    })
}

type RawCommand = (i64, i64, String, String, String, i64, i64);

fn raw_command(row: &Row<'_>) -> rusqlite::Result<RawCommand> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn hydrate_command(raw: RawCommand) -> PresetCommand {
    let (seq, preset_seq, name, code, command_type, order, deleted) = raw;
    PresetCommand {
        seq,
        preset_seq,
        name,
        code,
        command_type: CommandType::parse(&command_type),
        order,
        deleted: deleted != 0,
    }
}
