//! Reader command mapping persistence
//!
//! Mapping writes are full-replace only, executed inside a caller-held
//! transaction after validation. Reads filter soft-deleted rows.

use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, Transaction};
use tapgate_core::model::{MappingSpec, ReaderCommandMapping};

/// Repository for reader-to-device command mappings
pub struct MappingRepo;

impl MappingRepo {
    /// All live mappings for a reader
    pub fn live_mappings_for(
        conn: &Connection,
        reader_seq: i64,
    ) -> Result<Vec<ReaderCommandMapping>> {
        let mut stmt = conn
            .prepare(
                "SELECT mapping_seq, reader_seq, space_device_seq,
                        enter_command_seq, exit_command_seq
                 FROM reader_command_mappings
                 WHERE reader_seq = ?1 AND deleted = 0
                 ORDER BY mapping_seq ASC",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([reader_seq], |row| {
                Ok(ReaderCommandMapping {
                    seq: row.get(0)?,
                    reader_seq: row.get(1)?,
                    space_device_seq: row.get(2)?,
                    enter_command_seq: row.get(3)?,
                    exit_command_seq: row.get(4)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(rows)
    }

    /// Full-replace of a reader's mapping set within a transaction
    ///
    /// Deletes every existing mapping for the reader and inserts the
    /// given specs. Validation happens before the caller opens the
    /// transaction; an empty spec list therefore reverts the reader to
    /// the default policy.
    pub fn replace_all(tx: &Transaction, reader_seq: i64, specs: &[MappingSpec]) -> Result<usize> {
        tx.execute(
            "DELETE FROM reader_command_mappings WHERE reader_seq = ?1",
            [reader_seq],
        )
        .map_err(from_rusqlite)?;

        let now = chrono::Utc::now().timestamp();
        for spec in specs {
            tx.execute(
                "INSERT INTO reader_command_mappings
                     (reader_seq, space_device_seq, enter_command_seq, exit_command_seq,
                      deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
                rusqlite::params![
                    reader_seq,
                    spec.space_device_seq,
                    spec.enter_command_seq,
                    spec.exit_command_seq,
                    now,
                ],
            )
            .map_err(from_rusqlite)?;
        }

        Ok(specs.len())
    }
}
