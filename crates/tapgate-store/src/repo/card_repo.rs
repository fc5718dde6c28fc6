//! Card directory queries

use crate::errors::{corrupt_row, from_rusqlite, Result};
use crate::repo::from_unix;
use rusqlite::{Connection, OptionalExtension};
use tapgate_core::model::{Card, CardKind, CardStatus};

/// Read-side repository for cards
pub struct CardRepo;

impl CardRepo {
    /// Find the non-deleted card with this exact identifier, if any
    ///
    /// Status is NOT filtered here: the decision engine's status gate
    /// distinguishes inactive/blocked cards from unknown ones.
    pub fn find_by_identifier(conn: &Connection, identifier: &str) -> Result<Option<Card>> {
        let mut stmt = conn
            .prepare(
                "SELECT card_seq, user_seq, identifier, aid, label, kind, status,
                        deleted, created_at, updated_at
                 FROM cards
                 WHERE identifier = ?1 AND deleted = 0",
            )
            .map_err(from_rusqlite)?;

        let row = stmt
            .query_row([identifier], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, i64>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, i64>(9)?,
                ))
            })
            .optional()
            .map_err(from_rusqlite)?;

        let Some((seq, user_seq, identifier, aid, label, kind, status, deleted, created, updated)) =
            row
        else {
            return Ok(None);
        };

        let kind = CardKind::parse(&kind).ok_or_else(|| corrupt_row("cards", "kind", &kind))?;
        let status =
            CardStatus::parse(&status).ok_or_else(|| corrupt_row("cards", "status", &status))?;

        Ok(Some(Card {
            seq,
            user_seq,
            identifier,
            aid,
            label,
            kind,
            status,
            deleted: deleted != 0,
            created_at: from_unix(created),
            updated_at: from_unix(updated),
        }))
    }
}
