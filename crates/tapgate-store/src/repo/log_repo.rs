//! Append-only access log persistence
//!
//! Entries are inserted once and never updated or deleted; the toggle
//! lookup derives current state from the most recent ENTER/EXIT row.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use tapgate_core::model::{LogType, NewAccessLogEntry};

/// Repository for the append-only access log
pub struct LogRepo;

impl LogRepo {
    /// Append one entry; returns the assigned sequence
    pub fn append(conn: &Connection, entry: &NewAccessLogEntry) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO access_log
                 (reader_seq, card_seq, user_seq, space_seq, log_type,
                  tag_identifier, tag_aid, control_result, control_detail, tagged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                entry.reader_seq,
                entry.card_seq,
                entry.user_seq,
                entry.space_seq,
                entry.log_type.as_str(),
                entry.tag_identifier,
                entry.tag_aid,
                entry.control_result.map(|r| r.as_str()),
                entry.control_detail,
                now,
            ],
        )
        .map_err(from_rusqlite)?;

        let log_seq = conn.last_insert_rowid();
        tracing::debug!(
            log_seq,
            reader_seq = entry.reader_seq,
            log_type = entry.log_type.as_str(),
            "access log appended"
        );
        Ok(log_seq)
    }

    /// The log type of the most recent ENTER/EXIT entry for the exact
    /// (reader, card) pair, if any
    ///
    /// Ordered by sequence rather than timestamp so that entries within
    /// the same second still resolve deterministically.
    pub fn last_transition(
        conn: &Connection,
        reader_seq: i64,
        card_seq: i64,
    ) -> Result<Option<LogType>> {
        let row: Option<String> = conn
            .query_row(
                "SELECT log_type FROM access_log
                 WHERE reader_seq = ?1 AND card_seq = ?2
                   AND log_type IN ('ENTER', 'EXIT')
                 ORDER BY log_seq DESC
                 LIMIT 1",
                [reader_seq, card_seq],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        row.map(|s| LogType::parse(&s).ok_or_else(|| corrupt_row("access_log", "log_type", &s)))
            .transpose()
    }

    /// Total number of entries (test support and health reporting)
    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM access_log", [], |row| row.get(0))
            .map_err(from_rusqlite)
    }
}
