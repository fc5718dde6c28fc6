// End-to-end tag processing over a real SQLite store with a scripted
// dispatcher. Covers the toggle alternation property, policy
// exclusivity, and the one-audit-entry-per-event invariant across all
// terminal branches.

use rusqlite::Connection;
use std::cell::RefCell;
use tapgate_core::errors::{Result, TgError, TgErrorKind};
use tapgate_core::model::{
    CommandBinding, ControlResult, DeviceOutcome, DeviceResultStatus, DispatchReport, LogType,
    MappingSpec, ReaderContext,
};
use tapgate_core::ports::DeviceDispatcher;
use tapgate_core::{TagEvent, TagResult};
use tapgate_engine::commands::{process_tag, replace_mappings, resolve_reader};
use tempfile::TempDir;

fn setup_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let mut conn = Connection::open(&db_path).unwrap();
    tapgate_store::migrations::apply_migrations(&mut conn).unwrap();
    (temp_dir, conn)
}

fn seed_world(conn: &Connection) {
    conn.execute_batch(
        r#"
        INSERT INTO buildings (building_seq, building_name) VALUES (1, 'HQ');
        INSERT INTO spaces (space_seq, building_seq, space_name) VALUES (10, 1, 'Conference A');
        INSERT INTO users (user_seq, user_name) VALUES (200, 'Jordan Kim');
        INSERT INTO user_building_permissions (user_seq, building_seq) VALUES (200, 1);
        INSERT INTO cards (card_seq, user_seq, identifier, kind, status, deleted, created_at, updated_at)
        VALUES (100, 200, '04:AA:BB:CC', 'CARD', 'ACTIVE', 0, 0, 0);
        INSERT INTO readers (reader_seq, space_seq, reader_name, reader_code, api_key, status, deleted, created_at, updated_at)
        VALUES (1, 10, 'Lobby East', 'RD-001', 'rk_live_abc', 'ACTIVE', 0, 0, 0);
        INSERT INTO device_presets (preset_seq, preset_name) VALUES (5, 'Display Preset');
        INSERT INTO space_devices (space_device_seq, space_seq, preset_seq, device_name, status, device_order, deleted)
        VALUES (30, 10, 5, 'Display', 'ACTIVE', 0, 0);
        INSERT INTO preset_commands (command_seq, preset_seq, command_name, command_code, command_type, command_order, deleted)
        VALUES (300, 5, 'Power On', 'AA 01', 'POWER_ON', 0, 0),
               (301, 5, 'Power Off', 'AA 00', 'POWER_OFF', 1, 0);
    "#,
    )
    .unwrap();
}

fn reader_ctx() -> ReaderContext {
    ReaderContext {
        reader_seq: 1,
        space_seq: 10,
        name: "Lobby East".to_string(),
        code: "RD-001".to_string(),
    }
}

fn tag() -> TagEvent {
    TagEvent {
        identifier: "04:AA:BB:CC".to_string(),
        aid: None,
    }
}

fn log_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM access_log", [], |r| r.get(0))
        .unwrap()
}

enum Script {
    Succeed,
    FailAll,
    Fault,
}

/// Dispatcher that records every batch and plays a scripted outcome
struct ScriptedDispatcher {
    script: Script,
    batches: RefCell<Vec<Vec<CommandBinding>>>,
}

impl ScriptedDispatcher {
    fn new(script: Script) -> Self {
        Self {
            script,
            batches: RefCell::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<Vec<CommandBinding>> {
        self.batches.borrow().clone()
    }
}

impl DeviceDispatcher for ScriptedDispatcher {
    fn execute(&self, batch: &[CommandBinding], _acting_user_seq: i64) -> Result<DispatchReport> {
        self.batches.borrow_mut().push(batch.to_vec());
        match self.script {
            Script::Fault => Err(TgError::new(TgErrorKind::Dispatch)
                .with_message("transport exploded")),
            ref script => Ok(DispatchReport::from_outcomes(
                batch
                    .iter()
                    .map(|b| DeviceOutcome {
                        space_device_seq: b.space_device_seq,
                        device_name: format!("device-{}", b.space_device_seq),
                        command_type: "POWER_ON".to_string(),
                        result_status: match script {
                            Script::Succeed => DeviceResultStatus::Success,
                            _ => DeviceResultStatus::Fail,
                        },
                        result_message: None,
                    })
                    .collect(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Toggle alternation
// ---------------------------------------------------------------------------

#[test]
fn test_taps_strictly_alternate_enter_exit() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    let dispatcher = ScriptedDispatcher::new(Script::Succeed);

    let mut log_types = Vec::new();
    for _ in 0..4 {
        let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
        log_types.push(outcome.log_type);
    }

    assert_eq!(
        log_types,
        vec![LogType::Enter, LogType::Exit, LogType::Enter, LogType::Exit]
    );

    // Default policy dispatched POWER_ON / POWER_OFF alternately for
    // the single active device
    let batches = dispatcher.recorded();
    let dispatched: Vec<i64> = batches.iter().map(|b| b[0].command_seq).collect();
    assert_eq!(dispatched, vec![300, 301, 300, 301]);
    assert!(batches.iter().all(|b| b.len() == 1 && b[0].space_device_seq == 30));

    assert_eq!(log_count(&conn), 4);
}

#[test]
fn test_toggle_state_is_independent_per_reader() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    conn.execute_batch(
        "INSERT INTO readers (reader_seq, space_seq, reader_name, reader_code, api_key, status, deleted, created_at, updated_at)
         VALUES (2, 10, 'Lobby West', 'RD-002', 'rk_live_def', 'ACTIVE', 0, 0, 0);",
    )
    .unwrap();
    let dispatcher = ScriptedDispatcher::new(Script::Succeed);

    let first = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(first.log_type, LogType::Enter);

    // The same card at a second reader starts its own toggle
    let other_reader = ReaderContext {
        reader_seq: 2,
        space_seq: 10,
        name: "Lobby West".to_string(),
        code: "RD-002".to_string(),
    };
    let second = process_tag(&conn, &dispatcher, &other_reader, &tag()).unwrap();
    assert_eq!(second.log_type, LogType::Enter);
}

#[test]
fn test_other_cards_do_not_disturb_alternation() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    conn.execute_batch(
        "INSERT INTO cards (card_seq, user_seq, identifier, kind, status, deleted, created_at, updated_at)
         VALUES (101, 200, '04:DD:EE:FF', 'PHONE', 'ACTIVE', 0, 0, 0);",
    )
    .unwrap();
    let dispatcher = ScriptedDispatcher::new(Script::Succeed);

    let other = TagEvent {
        identifier: "04:DD:EE:FF".to_string(),
        aid: None,
    };

    let first = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    let interleaved = process_tag(&conn, &dispatcher, &reader_ctx(), &other).unwrap();
    let second = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();

    assert_eq!(first.log_type, LogType::Enter);
    assert_eq!(interleaved.log_type, LogType::Enter);
    assert_eq!(second.log_type, LogType::Exit);
}

// ---------------------------------------------------------------------------
// One audit entry per branch
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_identifier_writes_unknown_entry() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    let dispatcher = ScriptedDispatcher::new(Script::Succeed);

    let event = TagEvent {
        identifier: "04:99:99:99".to_string(),
        aid: Some("F000112233".to_string()),
    };
    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &event).unwrap();

    assert_eq!(outcome.result, TagResult::Unknown);
    assert_eq!(outcome.log_type, LogType::Unknown);
    assert_eq!(outcome.user_name, None);

    let (card_seq, user_seq, log_type, aid): (Option<i64>, Option<i64>, String, Option<String>) =
        conn.query_row(
            "SELECT card_seq, user_seq, log_type, tag_aid FROM access_log",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(card_seq, None);
    assert_eq!(user_seq, None);
    assert_eq!(log_type, "UNKNOWN");
    assert_eq!(aid, Some("F000112233".to_string()));
    assert_eq!(log_count(&conn), 1);

    // No dispatch is attempted for an unknown tag
    assert!(dispatcher.recorded().is_empty());
}

#[test]
fn test_every_denied_cause_writes_exactly_one_entry() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    let dispatcher = ScriptedDispatcher::new(Script::Succeed);

    // Cause 1: inactive card
    conn.execute("UPDATE cards SET status = 'INACTIVE' WHERE card_seq = 100", [])
        .unwrap();
    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(outcome.result, TagResult::Denied);
    assert_eq!(outcome.message, "Card is not approved");
    assert_eq!(log_count(&conn), 1);

    // Cause 2: blocked card
    conn.execute("UPDATE cards SET status = 'BLOCKED' WHERE card_seq = 100", [])
        .unwrap();
    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(outcome.message, "Card is blocked");
    assert_eq!(log_count(&conn), 2);

    // Cause 3: missing building permission
    conn.execute("UPDATE cards SET status = 'ACTIVE' WHERE card_seq = 100", [])
        .unwrap();
    conn.execute("DELETE FROM user_building_permissions", [])
        .unwrap();
    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(outcome.message, "No access permission for this building");
    assert_eq!(log_count(&conn), 3);

    // Cause 4: space without a building association
    conn.execute("UPDATE spaces SET building_seq = NULL WHERE space_seq = 10", [])
        .unwrap();
    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(outcome.message, "Space configuration error");
    assert_eq!(log_count(&conn), 4);

    // Every denial logged DENIED, none dispatched
    let denied: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM access_log WHERE log_type = 'DENIED'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(denied, 4);
    assert!(dispatcher.recorded().is_empty());

    // Restore and verify a denied history never affected the toggle
    conn.execute("UPDATE spaces SET building_seq = 1 WHERE space_seq = 10", [])
        .unwrap();
    conn.execute(
        "INSERT INTO user_building_permissions (user_seq, building_seq) VALUES (200, 1)",
        [],
    )
    .unwrap();
    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(outcome.log_type, LogType::Enter);
}

// ---------------------------------------------------------------------------
// Dispatch outcomes
// ---------------------------------------------------------------------------

#[test]
fn test_single_device_failure_is_fail_not_success() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    let dispatcher = ScriptedDispatcher::new(Script::FailAll);

    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();

    assert_eq!(outcome.result, TagResult::Fail);
    assert_eq!(outcome.control_result, Some(ControlResult::Fail));
    assert_eq!(outcome.log_type, LogType::Enter);

    let stored: String = conn
        .query_row("SELECT control_result FROM access_log", [], |r| r.get(0))
        .unwrap();
    assert_eq!(stored, "FAIL");
}

#[test]
fn test_dispatcher_fault_is_absorbed_and_logged() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    let dispatcher = ScriptedDispatcher::new(Script::Fault);

    let outcome = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();

    assert_eq!(outcome.result, TagResult::Fail);
    assert_eq!(outcome.control_result, Some(ControlResult::Fail));
    assert_eq!(outcome.control_summary, None);
    assert_eq!(log_count(&conn), 1);

    let detail: String = conn
        .query_row("SELECT control_detail FROM access_log", [], |r| r.get(0))
        .unwrap();
    assert!(detail.contains("transport exploded"));
}

#[test]
fn test_empty_mapping_replace_reverts_to_default_policy() {
    let (_tmp, mut conn) = setup_db();
    seed_world(&conn);
    let dispatcher = ScriptedDispatcher::new(Script::Succeed);

    // Curated mapping with only an exit command: the enter tap resolves
    // to an empty batch and skips the device layer
    replace_mappings(
        &mut conn,
        1,
        &[MappingSpec {
            space_device_seq: 30,
            enter_command_seq: None,
            exit_command_seq: Some(301),
        }],
    )
    .unwrap();

    let first = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(first.log_type, LogType::Enter);
    assert_eq!(first.control_result, Some(ControlResult::Skipped));
    assert!(dispatcher.recorded().is_empty());

    // Removing all mappings reverts the reader to the default policy on
    // the next tap
    replace_mappings(&mut conn, 1, &[]).unwrap();

    let second = process_tag(&conn, &dispatcher, &reader_ctx(), &tag()).unwrap();
    assert_eq!(second.log_type, LogType::Exit);
    assert_eq!(second.control_result, Some(ControlResult::Success));
    let batches = dispatcher.recorded();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![CommandBinding {
        space_device_seq: 30,
        command_seq: 301,
    }]);
}

// ---------------------------------------------------------------------------
// Reader resolution
// ---------------------------------------------------------------------------

#[test]
fn test_resolve_reader_by_api_key() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);

    let ctx = resolve_reader(&conn, "rk_live_abc").unwrap();
    assert_eq!(ctx.reader_seq, 1);
    assert_eq!(ctx.space_seq, 10);
    assert_eq!(ctx.code, "RD-001");
}

#[test]
fn test_resolve_reader_rejects_unknown_key() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);

    let err = resolve_reader(&conn, "rk_live_nope").unwrap_err();
    assert_eq!(err.kind(), TgErrorKind::Unauthorised);
}

#[test]
fn test_resolve_reader_rejects_inactive_reader() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    conn.execute("UPDATE readers SET status = 'INACTIVE' WHERE reader_seq = 1", [])
        .unwrap();

    let err = resolve_reader(&conn, "rk_live_abc").unwrap_err();
    assert_eq!(err.kind(), TgErrorKind::Forbidden);
}

#[test]
fn test_resolve_reader_ignores_deleted_reader() {
    let (_tmp, conn) = setup_db();
    seed_world(&conn);
    conn.execute("UPDATE readers SET deleted = 1 WHERE reader_seq = 1", [])
        .unwrap();

    let err = resolve_reader(&conn, "rk_live_abc").unwrap_err();
    assert_eq!(err.kind(), TgErrorKind::Unauthorised);
}
