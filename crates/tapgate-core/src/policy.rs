//! Dispatch policy and command resolution
//!
//! A reader either has a curated set of command mappings or it falls
//! back to the default all-active-devices policy. The two are mutually
//! exclusive: the presence of even one curated mapping disables the
//! default policy entirely. The union below makes that contract visible
//! in the type system instead of hiding it in an emptiness check.

use crate::errors::Result;
use crate::model::{CommandBinding, ReaderCommandMapping};
use crate::ports::MappingSource;
use crate::toggle::Direction;

/// How commands are selected for a reader's tag events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// No curated mappings: every ACTIVE device in the reader's space is
    /// paired with its preset's POWER_ON (enter) or POWER_OFF (exit)
    /// command
    Default,
    /// Administrator-defined mappings that replace the default policy
    Curated(Vec<ReaderCommandMapping>),
}

impl DispatchPolicy {
    /// Classify a reader's stored mapping set
    pub fn from_mappings(mappings: Vec<ReaderCommandMapping>) -> Self {
        if mappings.is_empty() {
            DispatchPolicy::Default
        } else {
            DispatchPolicy::Curated(mappings)
        }
    }

    pub fn is_curated(&self) -> bool {
        matches!(self, DispatchPolicy::Curated(_))
    }
}

/// Resolve the command batch for a tag event
///
/// Curated mappings are trusted as stored (they were validated at write
/// time); mappings without a command for the requested direction are
/// omitted. Under the default policy, devices whose preset lacks the
/// requested command type are silently skipped.
pub fn resolve_commands(
    source: &dyn MappingSource,
    reader_seq: i64,
    space_seq: i64,
    direction: Direction,
) -> Result<Vec<CommandBinding>> {
    let policy = DispatchPolicy::from_mappings(source.live_mappings_for(reader_seq)?);

    match policy {
        DispatchPolicy::Curated(mappings) => Ok(mappings
            .iter()
            .filter_map(|mapping| {
                mapping.command_for(direction).map(|command_seq| CommandBinding {
                    space_device_seq: mapping.space_device_seq,
                    command_seq,
                })
            })
            .collect()),
        DispatchPolicy::Default => {
            let wanted = direction.command_type();
            let mut bindings = Vec::new();
            for device in source.active_devices_in(space_seq)? {
                if let Some(command) = source.command_of_type(device.preset_seq, &wanted)? {
                    bindings.push(CommandBinding {
                        space_device_seq: device.seq,
                        command_seq: command.seq,
                    });
                }
            }
            Ok(bindings)
        }
    }
}
