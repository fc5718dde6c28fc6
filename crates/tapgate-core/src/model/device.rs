//! Controllable device and preset command models
//!
//! A space contains devices (displays, locks, lights) addressed over the
//! network. Each device carries a preset defining the commands it
//! understands; POWER_ON and POWER_OFF are the two types the default
//! dispatch policy selects by.

use std::fmt;

/// Lifecycle status of a space device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Active,
    Inactive,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "ACTIVE",
            DeviceStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(DeviceStatus::Active),
            "INACTIVE" => Some(DeviceStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a preset command
///
/// POWER_ON and POWER_OFF are distinguished because the default dispatch
/// policy selects commands by these types; anything else is carried
/// opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandType {
    PowerOn,
    PowerOff,
    Other(String),
}

impl CommandType {
    /// Stable string form used in persistence and on the wire
    pub fn as_str(&self) -> &str {
        match self {
            CommandType::PowerOn => "POWER_ON",
            CommandType::PowerOff => "POWER_OFF",
            CommandType::Other(s) => s.as_str(),
        }
    }

    /// Parse from the stable string form; never fails, unknown types are
    /// carried as `Other`
    pub fn parse(s: &str) -> Self {
        match s {
            "POWER_ON" => CommandType::PowerOn,
            "POWER_OFF" => CommandType::PowerOff,
            other => CommandType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network-addressable device installed in a space
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceDevice {
    /// Primary key
    pub seq: i64,

    /// The space this device is installed in
    pub space_seq: i64,

    /// The preset describing the device's command set
    pub preset_seq: i64,

    /// Display name
    pub name: String,

    /// Device address, if directly addressable
    pub ip: Option<String>,
    pub port: Option<u16>,

    /// Lifecycle status; only ACTIVE devices are dispatched to
    pub status: DeviceStatus,

    /// Display ordering
    pub order: i64,

    /// Soft-delete flag
    pub deleted: bool,
}

/// A command belonging to a device preset
#[derive(Debug, Clone, PartialEq)]
pub struct PresetCommand {
    pub seq: i64,
    pub preset_seq: i64,
    pub name: String,
    /// Raw command payload sent over the transport
    pub code: String,
    pub command_type: CommandType,
    pub order: i64,
    pub deleted: bool,
}
