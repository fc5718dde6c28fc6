// Tests for the fan-out dispatcher: concurrent per-device execution,
// deadline-bounded joining, and stale-binding degradation.

use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;
use tapgate_core::model::{CommandBinding, DeviceResultStatus, PresetCommand, SpaceDevice};
use tapgate_core::ports::DeviceDispatcher;
use tapgate_engine::transport::{CommandTransport, TransportFault};
use tapgate_engine::NfcDispatcher;
use tempfile::TempDir;

fn setup_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let mut conn = Connection::open(&db_path).unwrap();
    tapgate_store::migrations::apply_migrations(&mut conn).unwrap();
    (temp_dir, conn)
}

fn seed_devices(conn: &Connection) {
    conn.execute_batch(
        r#"
        INSERT INTO buildings (building_seq, building_name) VALUES (1, 'HQ');
        INSERT INTO spaces (space_seq, building_seq, space_name) VALUES (10, 1, 'Conference A');
        INSERT INTO device_presets (preset_seq, preset_name) VALUES (5, 'Display Preset');
        INSERT INTO space_devices (space_device_seq, space_seq, preset_seq, device_name, status, device_order, deleted)
        VALUES (30, 10, 5, 'ok-device', 'ACTIVE', 0, 0),
               (31, 10, 5, 'fail-device', 'ACTIVE', 1, 0),
               (32, 10, 5, 'slow-device', 'ACTIVE', 2, 0),
               (33, 10, 5, 'parked-device', 'INACTIVE', 3, 0);
        INSERT INTO preset_commands (command_seq, preset_seq, command_name, command_code, command_type, command_order, deleted)
        VALUES (300, 5, 'Power On', 'AA 01', 'POWER_ON', 0, 0);
    "#,
    )
    .unwrap();
}

/// Transport whose behavior is keyed by device name
struct NamedTransport;

impl CommandTransport for NamedTransport {
    fn send(
        &self,
        device: &SpaceDevice,
        _command: &PresetCommand,
    ) -> std::result::Result<String, TransportFault> {
        match device.name.as_str() {
            "ok-device" => Ok("ack".to_string()),
            "fail-device" => Err(TransportFault::Failed("connection refused".to_string())),
            "slow-device" => {
                std::thread::sleep(Duration::from_millis(500));
                Ok("late ack".to_string())
            }
            other => Err(TransportFault::Failed(format!("unexpected device {}", other))),
        }
    }
}

fn binding(device: i64) -> CommandBinding {
    CommandBinding {
        space_device_seq: device,
        command_seq: 300,
    }
}

#[test]
fn test_all_devices_succeed() {
    let (_tmp, conn) = setup_db();
    seed_devices(&conn);
    let dispatcher = NfcDispatcher::new(&conn, Arc::new(NamedTransport), Duration::from_secs(2));

    let report = dispatcher.execute(&[binding(30)], 200).unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.fail_count, 0);
    assert_eq!(report.results[0].result_status, DeviceResultStatus::Success);
    assert_eq!(report.results[0].device_name, "ok-device");
    assert_eq!(report.results[0].command_type, "POWER_ON");
    assert_eq!(report.results[0].result_message.as_deref(), Some("ack"));
}

#[test]
fn test_mixed_outcomes_keep_batch_order() {
    let (_tmp, conn) = setup_db();
    seed_devices(&conn);
    let dispatcher = NfcDispatcher::new(&conn, Arc::new(NamedTransport), Duration::from_secs(2));

    let report = dispatcher
        .execute(&[binding(31), binding(30)], 200)
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.fail_count, 1);
    // Outcomes come back in the original batch order
    assert_eq!(report.results[0].device_name, "fail-device");
    assert_eq!(report.results[0].result_status, DeviceResultStatus::Fail);
    assert_eq!(report.results[1].device_name, "ok-device");
    assert_eq!(report.results[1].result_status, DeviceResultStatus::Success);
}

#[test]
fn test_deadline_classifies_stragglers_as_timeout() {
    let (_tmp, conn) = setup_db();
    seed_devices(&conn);
    let dispatcher =
        NfcDispatcher::new(&conn, Arc::new(NamedTransport), Duration::from_millis(100));

    let report = dispatcher
        .execute(&[binding(30), binding(32)], 200)
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.fail_count, 1);

    // The slow device missed the batch deadline without blocking the
    // fast one
    let slow = report
        .results
        .iter()
        .find(|r| r.device_name == "slow-device")
        .unwrap();
    assert_eq!(slow.result_status, DeviceResultStatus::Timeout);

    let ok = report
        .results
        .iter()
        .find(|r| r.device_name == "ok-device")
        .unwrap();
    assert_eq!(ok.result_status, DeviceResultStatus::Success);
}

#[test]
fn test_inactive_device_fails_without_transport_call() {
    let (_tmp, conn) = setup_db();
    seed_devices(&conn);
    let dispatcher = NfcDispatcher::new(&conn, Arc::new(NamedTransport), Duration::from_secs(2));

    let report = dispatcher.execute(&[binding(33)], 200).unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].result_status, DeviceResultStatus::Fail);
    assert_eq!(
        report.results[0].result_message.as_deref(),
        Some("device is inactive")
    );
}

#[test]
fn test_unknown_device_and_command_degrade_to_fail() {
    let (_tmp, conn) = setup_db();
    seed_devices(&conn);
    let dispatcher = NfcDispatcher::new(&conn, Arc::new(NamedTransport), Duration::from_secs(2));

    let report = dispatcher
        .execute(
            &[
                CommandBinding {
                    space_device_seq: 999,
                    command_seq: 300,
                },
                CommandBinding {
                    space_device_seq: 30,
                    command_seq: 999,
                },
            ],
            200,
        )
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.fail_count, 2);
    assert_eq!(
        report.results[0].result_message.as_deref(),
        Some("device not found")
    );
    assert_eq!(
        report.results[1].result_message.as_deref(),
        Some("command not found")
    );
}
