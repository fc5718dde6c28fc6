//! Reader API-key resolution
//!
//! The API key is an opaque bearer credential presented by the reader
//! agent; it resolves to the reader identity every tag event is
//! processed under. Resolution rejects unknown keys and inactive
//! readers before any tag processing starts.

use rusqlite::Connection;
use tapgate_core::errors::{Result, TgError, TgErrorKind};
use tapgate_core::model::{ReaderContext, ReaderStatus};
use tapgate_store::repo::ReaderRepo;

/// Resolve an API key to the reader identity it belongs to
///
/// # Errors
///
/// - `Unauthorised`: no non-deleted reader holds this key
/// - `Forbidden`: the reader exists but is INACTIVE
pub fn resolve_reader(conn: &Connection, api_key: &str) -> Result<ReaderContext> {
    let reader = ReaderRepo::find_by_api_key(conn, api_key)?.ok_or_else(|| {
        TgError::new(TgErrorKind::Unauthorised)
            .with_op("resolve_reader")
            .with_message("Invalid API key")
    })?;

    if reader.status == ReaderStatus::Inactive {
        return Err(TgError::new(TgErrorKind::Forbidden)
            .with_op("resolve_reader")
            .with_reader_seq(reader.seq)
            .with_message("Reader is inactive"));
    }

    tracing::debug!(reader_seq = reader.seq, code = %reader.code, "reader resolved");

    Ok(ReaderContext {
        reader_seq: reader.seq,
        space_seq: reader.space_seq,
        name: reader.name,
        code: reader.code,
    })
}
