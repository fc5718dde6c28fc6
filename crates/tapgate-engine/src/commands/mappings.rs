//! Mapping administration
//!
//! Full-replace and auto-map writes for a reader's command mapping set,
//! plus the administrative view listing every device with its available
//! commands and current mapping.
//!
//! All validations run BEFORE any write, and the delete+insert happens
//! in one transaction: a rejected request leaves the reader's existing
//! mappings untouched.

use rusqlite::Connection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tapgate_core::errors::{DomainError, Result};
use tapgate_core::model::{CommandType, MappingSpec, PresetCommand, Reader};
use tapgate_core::{log_op_end, log_op_error, log_op_start};
use tapgate_store::errors::from_rusqlite;
use tapgate_store::repo::{DeviceRepo, MappingRepo, ReaderRepo, SpaceRepo};

/// Result of a mapping write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingWriteSummary {
    pub message: String,
    pub mapped_count: usize,
    pub total_devices: usize,
}

/// A command as shown in the administrative view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandView {
    pub command_seq: i64,
    pub command_name: String,
    pub command_code: String,
    pub command_type: String,
}

impl CommandView {
    fn of(command: &PresetCommand) -> Self {
        Self {
            command_seq: command.seq,
            command_name: command.name.clone(),
            command_code: command.code.clone(),
            command_type: command.command_type.as_str().to_string(),
        }
    }
}

/// One device row in the administrative view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMappingView {
    pub space_device_seq: i64,
    pub device_name: String,
    pub device_status: String,
    pub is_mapped: bool,
    pub enter_command: Option<CommandView>,
    pub exit_command: Option<CommandView>,
    pub available_commands: Vec<CommandView>,
}

/// The administrative view of a reader's mapping state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderCommandsView {
    pub reader_seq: i64,
    pub reader_name: String,
    pub space_seq: i64,
    pub space_name: String,
    pub building_name: String,
    pub devices: Vec<DeviceMappingView>,
    pub mapped_count: usize,
    pub total_devices: usize,
}

/// Replace a reader's mapping set
///
/// An empty spec list is valid and means "remove all mappings, revert
/// this reader to the default policy."
///
/// # Errors
///
/// - `ReaderNotFound`: unknown or deleted reader
/// - `DeviceNotInSpace`: a spec references a device outside the
///   reader's space (identifies the offending device)
/// - `CommandNotFound`: a spec references a missing or deleted command
///   (identifies the command)
pub fn replace_mappings(
    conn: &mut Connection,
    reader_seq: i64,
    specs: &[MappingSpec],
) -> Result<MappingWriteSummary> {
    log_op_start!("replace_mappings", reader_seq = reader_seq, count = specs.len());
    let start = std::time::Instant::now();

    let result = replace_mappings_impl(conn, reader_seq, specs).map_err(|e| {
        log_op_error!(
            "replace_mappings",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            reader_seq = reader_seq
        );
        e
    })?;

    log_op_end!(
        "replace_mappings",
        duration_ms = start.elapsed().as_millis() as u64,
        reader_seq = reader_seq,
        mapped_count = result.mapped_count
    );

    Ok(result)
}

fn replace_mappings_impl(
    conn: &mut Connection,
    reader_seq: i64,
    specs: &[MappingSpec],
) -> Result<MappingWriteSummary> {
    let reader = find_live_reader(conn, reader_seq)?;
    let devices = DeviceRepo::active_devices_in(conn, reader.space_seq)?;
    let device_seqs: HashSet<i64> = devices.iter().map(|d| d.seq).collect();

    // Validate everything before any write
    for spec in specs {
        if !device_seqs.contains(&spec.space_device_seq) {
            return Err(DomainError::DeviceNotInSpace {
                device_seq: spec.space_device_seq,
            }
            .into());
        }

        for command_seq in [spec.enter_command_seq, spec.exit_command_seq]
            .into_iter()
            .flatten()
        {
            if DeviceRepo::find_command(conn, command_seq)?.is_none() {
                return Err(DomainError::CommandNotFound { command_seq }.into());
            }
        }
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    let saved = MappingRepo::replace_all(&tx, reader_seq, specs)?;
    tx.commit().map_err(from_rusqlite)?;

    let message = if saved == 0 {
        "All command mappings removed".to_string()
    } else {
        "Command mappings saved".to_string()
    };

    Ok(MappingWriteSummary {
        message,
        mapped_count: saved,
        total_devices: devices.len(),
    })
}

/// Auto-map every ACTIVE device in the reader's space
///
/// Selects POWER_ON as the enter command and POWER_OFF as the exit
/// command by type; devices with neither are skipped. Same full-replace
/// semantics as [`replace_mappings`].
pub fn auto_map_all(conn: &mut Connection, reader_seq: i64) -> Result<MappingWriteSummary> {
    log_op_start!("auto_map_all", reader_seq = reader_seq);
    let start = std::time::Instant::now();

    let result = auto_map_all_impl(conn, reader_seq).map_err(|e| {
        log_op_error!(
            "auto_map_all",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            reader_seq = reader_seq
        );
        e
    })?;

    log_op_end!(
        "auto_map_all",
        duration_ms = start.elapsed().as_millis() as u64,
        reader_seq = reader_seq,
        mapped_count = result.mapped_count
    );

    Ok(result)
}

fn auto_map_all_impl(conn: &mut Connection, reader_seq: i64) -> Result<MappingWriteSummary> {
    let reader = find_live_reader(conn, reader_seq)?;
    let devices = DeviceRepo::active_devices_in(conn, reader.space_seq)?;

    let mut specs = Vec::new();
    for device in &devices {
        let power_on = DeviceRepo::command_of_type(conn, device.preset_seq, &CommandType::PowerOn)?;
        let power_off =
            DeviceRepo::command_of_type(conn, device.preset_seq, &CommandType::PowerOff)?;

        if power_on.is_some() || power_off.is_some() {
            specs.push(MappingSpec {
                space_device_seq: device.seq,
                enter_command_seq: power_on.map(|c| c.seq),
                exit_command_seq: power_off.map(|c| c.seq),
            });
        }
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    let saved = MappingRepo::replace_all(&tx, reader_seq, &specs)?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(MappingWriteSummary {
        message: "Auto-mapped all active devices".to_string(),
        mapped_count: saved,
        total_devices: devices.len(),
    })
}

/// Administrative view: every device in the reader's space with its
/// available commands and current mapping
pub fn get_reader_commands(conn: &Connection, reader_seq: i64) -> Result<ReaderCommandsView> {
    let reader = find_live_reader(conn, reader_seq)?;

    let space = SpaceRepo::find_space(conn, reader.space_seq)?.ok_or(
        DomainError::SpaceNotFound {
            space_seq: reader.space_seq,
        },
    )?;

    let building_name = match space.building_seq {
        Some(building_seq) => SpaceRepo::building_name(conn, building_seq)?.unwrap_or_default(),
        None => String::new(),
    };

    let devices = DeviceRepo::devices_in(conn, reader.space_seq)?;
    let mappings = MappingRepo::live_mappings_for(conn, reader_seq)?;
    let mapped_count = mappings.len();
    let by_device: HashMap<i64, _> = mappings
        .into_iter()
        .map(|m| (m.space_device_seq, m))
        .collect();

    let mut device_views = Vec::with_capacity(devices.len());
    for device in &devices {
        let mapping = by_device.get(&device.seq);

        let enter_command = resolve_view(conn, mapping.and_then(|m| m.enter_command_seq))?;
        let exit_command = resolve_view(conn, mapping.and_then(|m| m.exit_command_seq))?;
        let available_commands = DeviceRepo::commands_for_preset(conn, device.preset_seq)?
            .iter()
            .map(CommandView::of)
            .collect();

        device_views.push(DeviceMappingView {
            space_device_seq: device.seq,
            device_name: device.name.clone(),
            device_status: device.status.as_str().to_string(),
            is_mapped: mapping.is_some(),
            enter_command,
            exit_command,
            available_commands,
        });
    }

    Ok(ReaderCommandsView {
        reader_seq: reader.seq,
        reader_name: reader.name,
        space_seq: space.seq,
        space_name: space.name,
        building_name,
        devices: device_views,
        mapped_count,
        total_devices: devices.len(),
    })
}

fn resolve_view(conn: &Connection, command_seq: Option<i64>) -> Result<Option<CommandView>> {
    match command_seq {
        Some(seq) => Ok(DeviceRepo::find_command(conn, seq)?
            .as_ref()
            .map(CommandView::of)),
        None => Ok(None),
    }
}

fn find_live_reader(conn: &Connection, reader_seq: i64) -> Result<Reader> {
    ReaderRepo::find_live(conn, reader_seq)?
        .ok_or_else(|| DomainError::ReaderNotFound { reader_seq }.into())
}
