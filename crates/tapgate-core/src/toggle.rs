//! Toggle state resolution
//!
//! The enter/exit state of a (reader, card) pair is a strict two-state
//! machine derived from the most recent ENTER/EXIT audit entry for that
//! exact pair. There is no occupancy object, no session identifier and
//! no timeout-based auto-exit; the same card at two readers toggles
//! independently per reader.

use crate::errors::Result;
use crate::model::{CommandType, LogType};
use crate::ports::AuditLog;
use std::fmt;

/// The transition a tag event will record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Enter,
    Exit,
}

impl Direction {
    /// The audit log type this transition persists as
    pub fn log_type(&self) -> LogType {
        match self {
            Direction::Enter => LogType::Enter,
            Direction::Exit => LogType::Exit,
        }
    }

    /// The command type the default dispatch policy selects for this
    /// transition
    pub fn command_type(&self) -> CommandType {
        match self {
            Direction::Enter => CommandType::PowerOn,
            Direction::Exit => CommandType::PowerOff,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Enter => "ENTER",
            Direction::Exit => "EXIT",
        })
    }
}

/// Pure toggle rule: no prior transition or a prior EXIT means the next
/// state is ENTER; a prior ENTER means EXIT
pub fn next_direction(last_transition: Option<LogType>) -> Direction {
    match last_transition {
        Some(LogType::Enter) => Direction::Exit,
        _ => Direction::Enter,
    }
}

/// Resolve the next transition for a (reader, card) pair from the audit
/// log
pub fn resolve_next_direction(
    audit: &dyn AuditLog,
    reader_seq: i64,
    card_seq: i64,
) -> Result<Direction> {
    let last = audit.last_transition(reader_seq, card_seq)?;
    Ok(next_direction(last))
}
