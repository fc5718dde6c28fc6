//! Domain models for the access-control core
//!
//! Cards, readers, spaces, devices, command mappings, the append-only
//! access log, and the dispatch value types exchanged with the device
//! dispatcher.

pub mod access_log;
pub mod card;
pub mod device;
pub mod dispatch;
pub mod mapping;
pub mod reader;
pub mod space;

pub use access_log::{AccessLogEntry, ControlResult, LogType, NewAccessLogEntry};
pub use card::{Card, CardKind, CardStatus};
pub use device::{CommandType, DeviceStatus, PresetCommand, SpaceDevice};
pub use dispatch::{
    CommandBinding, ControlSummary, DeviceOutcome, DeviceResultStatus, DispatchReport,
};
pub use mapping::{MappingSpec, ReaderCommandMapping};
pub use reader::{Reader, ReaderContext, ReaderStatus};
pub use space::Space;
