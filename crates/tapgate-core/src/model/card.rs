//! Card domain model
//!
//! A card is the physical credential (badge or phone) presented at a
//! reader. Cards are soft-deleted only; at most one non-deleted card
//! exists per tag identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a card
///
/// Only ACTIVE cards pass the decision engine's status gate; INACTIVE
/// and BLOCKED cards terminate in DENIED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    Active,
    Inactive,
    Blocked,
}

impl CardStatus {
    /// Stable string form used in persistence and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Active => "ACTIVE",
            CardStatus::Inactive => "INACTIVE",
            CardStatus::Blocked => "BLOCKED",
        }
    }

    /// Parse from the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(CardStatus::Active),
            "INACTIVE" => Some(CardStatus::Inactive),
            "BLOCKED" => Some(CardStatus::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical form of the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    Card,
    Phone,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Card => "CARD",
            CardKind::Phone => "PHONE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CARD" => Some(CardKind::Card),
            "PHONE" => Some(CardKind::Phone),
            _ => None,
        }
    }
}

/// A registered credential bound to a user
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Primary key
    pub seq: i64,

    /// Owning user
    pub user_seq: i64,

    /// Unique opaque tag identifier read from the credential
    pub identifier: String,

    /// Optional secondary identifier (AID) used for fuzzy lookups
    pub aid: Option<String>,

    /// Human-readable label
    pub label: Option<String>,

    /// Physical form
    pub kind: CardKind,

    /// Lifecycle status
    pub status: CardStatus,

    /// Soft-delete flag
    pub deleted: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Card({}, identifier={}, status={})",
            self.seq, self.identifier, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [CardStatus::Active, CardStatus::Inactive, CardStatus::Blocked] {
            assert_eq!(CardStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CardStatus::parse("bogus"), None);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [CardKind::Card, CardKind::Phone] {
            assert_eq!(CardKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_status_serde_form() {
        let json = serde_json::to_string(&CardStatus::Blocked).unwrap();
        assert_eq!(json, "\"BLOCKED\"");
    }
}
