//! Tag-event command handler
//!
//! The thin boundary around the core decision engine: builds the port
//! adapter over the connection, runs the decision, and owns the
//! operation lifecycle logging.

use rusqlite::Connection;
use tapgate_core::errors::Result;
use tapgate_core::model::ReaderContext;
use tapgate_core::ports::DeviceDispatcher;
use tapgate_core::{log_op_end, log_op_error, log_op_start};
use tapgate_core::{DecisionEngine, TagEvent, TagOutcome};
use tapgate_store::repo::SqliteStore;

/// Process one tag event to its terminal state
///
/// Exactly one access-log entry is written on every `Ok` return; an
/// `Err` means the event could not be accepted for processing and is
/// surfaced to the caller as an operational error.
pub fn process_tag(
    conn: &Connection,
    dispatcher: &dyn DeviceDispatcher,
    reader: &ReaderContext,
    event: &TagEvent,
) -> Result<TagOutcome> {
    log_op_start!("process_tag", reader_seq = reader.reader_seq);
    let start = std::time::Instant::now();

    let outcome = process_tag_impl(conn, dispatcher, reader, event).map_err(|e| {
        log_op_error!(
            "process_tag",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            reader_seq = reader.reader_seq
        );
        e
    })?;

    log_op_end!(
        "process_tag",
        duration_ms = start.elapsed().as_millis() as u64,
        reader_seq = reader.reader_seq,
        log_type = outcome.log_type.as_str(),
        result = outcome.result.as_str()
    );

    Ok(outcome)
}

fn process_tag_impl(
    conn: &Connection,
    dispatcher: &dyn DeviceDispatcher,
    reader: &ReaderContext,
    event: &TagEvent,
) -> Result<TagOutcome> {
    let store = SqliteStore::new(conn);

    let engine = DecisionEngine {
        cards: &store,
        permissions: &store,
        spaces: &store,
        users: &store,
        mappings: &store,
        audit: &store,
        dispatcher,
    };

    engine.process(reader, event)
}
