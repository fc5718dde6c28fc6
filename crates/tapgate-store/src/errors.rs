//! Error handling for tapgate-store
//!
//! Wraps tapgate-core TgError with store-specific helpers

use tapgate_core::errors::{TgError, TgErrorKind};

/// Result type alias using TgError
pub type Result<T> = std::result::Result<T, TgError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> TgError {
    TgError::new(TgErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> TgError {
    TgError::new(TgErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> TgError {
    TgError::new(TgErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an error for a stored value that no longer parses
pub fn corrupt_row(table: &str, column: &str, value: &str) -> TgError {
    TgError::new(TgErrorKind::Persistence)
        .with_op("hydrate")
        .with_entity(format!("{}.{}", table, column))
        .with_message(format!(
            "Stored value '{}' in {}.{} is not valid",
            value, table, column
        ))
}

