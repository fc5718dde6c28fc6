//! Repository layer
//!
//! Per-entity repositories with static query functions, plus
//! [`SqliteStore`], the adapter implementing the core's collaborator
//! ports over a borrowed connection.

pub mod card_repo;
pub mod device_repo;
pub mod log_repo;
pub mod mapping_repo;
pub mod reader_repo;
pub mod space_repo;
pub mod store;

pub use card_repo::CardRepo;
pub use device_repo::DeviceRepo;
pub use log_repo::LogRepo;
pub use mapping_repo::MappingRepo;
pub use reader_repo::ReaderRepo;
pub use space_repo::SpaceRepo;
pub use store::SqliteStore;

use chrono::{DateTime, Utc};

/// Reconstruct a timestamp persisted as unix seconds
pub(crate) fn from_unix(secs: i64) -> DateTime<Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(chrono::Utc::now)
}
