//! Space projection
//!
//! A space is the physical room a reader controls. Spaces belong to a
//! building; a space without a building association is a configuration
//! error that the decision engine denies on.

/// A space as seen by the access-control core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    pub seq: i64,
    /// Nullable: a misconfigured space may lack a building association
    pub building_seq: Option<i64>,
    pub name: String,
}
