//! Command handlers
//!
//! The engine layer owns lifecycle logging for operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal
//! details.

pub mod auth;
pub mod mappings;
pub mod tag;

pub use auth::resolve_reader;
pub use mappings::{auto_map_all, get_reader_commands, replace_mappings};
pub use tag::process_tag;
