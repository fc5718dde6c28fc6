//! Space, building, user and permission lookups

use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use tapgate_core::model::Space;

/// Read-side repository for spaces and the permission directory
pub struct SpaceRepo;

impl SpaceRepo {
    /// Find a non-deleted space by sequence
    pub fn find_space(conn: &Connection, space_seq: i64) -> Result<Option<Space>> {
        let mut stmt = conn
            .prepare(
                "SELECT space_seq, building_seq, space_name
                 FROM spaces
                 WHERE space_seq = ?1 AND deleted = 0",
            )
            .map_err(from_rusqlite)?;

        stmt.query_row([space_seq], |row| {
            Ok(Space {
                seq: row.get(0)?,
                building_seq: row.get(1)?,
                name: row.get(2)?,
            })
        })
        .optional()
        .map_err(from_rusqlite)
    }

    /// Display name of a non-deleted building
    pub fn building_name(conn: &Connection, building_seq: i64) -> Result<Option<String>> {
        conn.query_row(
            "SELECT building_name FROM buildings WHERE building_seq = ?1 AND deleted = 0",
            [building_seq],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Display name of a non-deleted user
    pub fn user_name(conn: &Connection, user_seq: i64) -> Result<Option<String>> {
        conn.query_row(
            "SELECT user_name FROM users WHERE user_seq = ?1 AND deleted = 0",
            [user_seq],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Whether a permission record exists for (user, building)
    pub fn has_building_permission(
        conn: &Connection,
        user_seq: i64,
        building_seq: i64,
    ) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM user_building_permissions
                 WHERE user_seq = ?1 AND building_seq = ?2",
                [user_seq, building_seq],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        Ok(found.is_some())
    }
}
