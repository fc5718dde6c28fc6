//! Reader lookups
//!
//! Readers authenticate with an opaque API key; resolution happens once
//! per tag event at the boundary.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use crate::repo::from_unix;
use rusqlite::{Connection, OptionalExtension, Row};
use tapgate_core::model::{Reader, ReaderStatus};
use tapgate_core_types::Sensitive;

const READER_COLUMNS: &str = "reader_seq, space_seq, reader_name, reader_code, serial, api_key,
                              status, deleted, created_at, updated_at";

/// Read-side repository for readers
pub struct ReaderRepo;

impl ReaderRepo {
    /// Find the non-deleted reader holding this API key, if any
    pub fn find_by_api_key(conn: &Connection, api_key: &str) -> Result<Option<Reader>> {
        let sql = format!(
            "SELECT {} FROM readers WHERE api_key = ?1 AND deleted = 0",
            READER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

        let row = stmt
            .query_row([api_key], raw_reader)
            .optional()
            .map_err(from_rusqlite)?;

        row.map(hydrate_reader).transpose()
    }

    /// Find a non-deleted reader by sequence, if any
    pub fn find_live(conn: &Connection, reader_seq: i64) -> Result<Option<Reader>> {
        let sql = format!(
            "SELECT {} FROM readers WHERE reader_seq = ?1 AND deleted = 0",
            READER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

        let row = stmt
            .query_row([reader_seq], raw_reader)
            .optional()
            .map_err(from_rusqlite)?;

        row.map(hydrate_reader).transpose()
    }
}

type RawReader = (
    i64,
    i64,
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
    i64,
    i64,
);

fn raw_reader(row: &Row<'_>) -> rusqlite::Result<RawReader> {
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
        row.get(9)?,
    ))
}

fn hydrate_reader(raw: RawReader) -> Result<Reader> {
    let (seq, space_seq, name, code, serial, api_key, status, deleted, created, updated) = raw;
    let status =
        ReaderStatus::parse(&status).ok_or_else(|| corrupt_row("readers", "status", &status))?;

    Ok(Reader {
        seq,
        space_seq,
        name,
        code,
        serial,
        api_key: Sensitive::new(api_key),
        status,
        deleted: deleted != 0,
        created_at: from_unix(created),
        updated_at: from_unix(updated),
    })
}
