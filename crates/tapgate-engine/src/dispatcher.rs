//! Batch device dispatcher
//!
//! Resolves a batch of (device, command) bindings to their stored rows,
//! fans the per-device sends out concurrently over the command
//! transport, and joins all outcomes under one bounded deadline. A
//! device that misses the deadline is classified TIMEOUT for that
//! device only and does not block aggregation of the others.
//!
//! One batch call per tag event; retries are the caller's decision and
//! never happen within an event.

use crate::transport::{CommandTransport, TransportFault};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tapgate_core::errors::Result;
use tapgate_core::model::{
    CommandBinding, DeviceOutcome, DeviceResultStatus, DeviceStatus, DispatchReport,
    PresetCommand, SpaceDevice,
};
use tapgate_core::ports::DeviceDispatcher;
use tapgate_store::repo::DeviceRepo;

/// Dispatcher backed by the SQLite device catalog and a command
/// transport
pub struct NfcDispatcher<'a, T> {
    conn: &'a Connection,
    transport: Arc<T>,
    deadline: Duration,
}

impl<'a, T> NfcDispatcher<'a, T> {
    pub fn new(conn: &'a Connection, transport: Arc<T>, deadline: Duration) -> Self {
        Self {
            conn,
            transport,
            deadline,
        }
    }
}

struct DispatchJob {
    slot: usize,
    device: SpaceDevice,
    command: PresetCommand,
}

impl<T: CommandTransport + 'static> DeviceDispatcher for NfcDispatcher<'_, T> {
    fn execute(&self, batch: &[CommandBinding], acting_user_seq: i64) -> Result<DispatchReport> {
        tracing::debug!(
            batch_len = batch.len(),
            acting_user_seq,
            "dispatching device batch"
        );

        let mut slots: Vec<Option<DeviceOutcome>> = vec![None; batch.len()];
        let mut jobs = Vec::new();

        // Resolve rows up front; stale bindings degrade to FAIL
        // outcomes rather than aborting the batch
        for (slot, binding) in batch.iter().enumerate() {
            match DeviceRepo::find_device(self.conn, binding.space_device_seq)? {
                Some(device) if device.status == DeviceStatus::Active => {
                    match DeviceRepo::find_command(self.conn, binding.command_seq)? {
                        Some(command) => jobs.push(DispatchJob {
                            slot,
                            device,
                            command,
                        }),
                        None => {
                            slots[slot] = Some(DeviceOutcome {
                                space_device_seq: binding.space_device_seq,
                                device_name: device.name,
                                command_type: "UNKNOWN".to_string(),
                                result_status: DeviceResultStatus::Fail,
                                result_message: Some("command not found".to_string()),
                            });
                        }
                    }
                }
                Some(device) => {
                    slots[slot] = Some(DeviceOutcome {
                        space_device_seq: binding.space_device_seq,
                        device_name: device.name,
                        command_type: "UNKNOWN".to_string(),
                        result_status: DeviceResultStatus::Fail,
                        result_message: Some("device is inactive".to_string()),
                    });
                }
                None => {
                    slots[slot] = Some(DeviceOutcome {
                        space_device_seq: binding.space_device_seq,
                        device_name: "unknown".to_string(),
                        command_type: "UNKNOWN".to_string(),
                        result_status: DeviceResultStatus::Fail,
                        result_message: Some("device not found".to_string()),
                    });
                }
            }
        }

        // Identity of in-flight slots, kept for TIMEOUT fill-in
        let mut in_flight: HashMap<usize, (i64, String, String)> = jobs
            .iter()
            .map(|job| {
                (
                    job.slot,
                    (
                        job.device.seq,
                        job.device.name.clone(),
                        job.command.command_type.as_str().to_string(),
                    ),
                )
            })
            .collect();

        // Fan out: devices are independent actuators with no ordering
        // dependency between them
        let (tx, rx) = mpsc::channel();
        let mut pending = jobs.len();
        for job in jobs {
            let transport = Arc::clone(&self.transport);
            let tx = tx.clone();
            thread::spawn(move || {
                let outcome = run_job(transport.as_ref(), &job.device, &job.command);
                let _ = tx.send((job.slot, outcome));
            });
        }
        drop(tx);

        // Join under one deadline; stragglers are left to finish on
        // their own and recorded as TIMEOUT
        let deadline = Instant::now() + self.deadline;
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((slot, outcome)) => {
                    in_flight.remove(&slot);
                    slots[slot] = Some(outcome);
                    pending -= 1;
                }
                Err(_) => break,
            }
        }

        for (slot, (device_seq, device_name, command_type)) in in_flight {
            slots[slot] = Some(DeviceOutcome {
                space_device_seq: device_seq,
                device_name,
                command_type,
                result_status: DeviceResultStatus::Timeout,
                result_message: Some("device response timed out".to_string()),
            });
        }

        let outcomes: Vec<DeviceOutcome> = slots.into_iter().flatten().collect();
        Ok(DispatchReport::from_outcomes(outcomes))
    }
}

fn run_job<T: CommandTransport + ?Sized>(
    transport: &T,
    device: &SpaceDevice,
    command: &PresetCommand,
) -> DeviceOutcome {
    let command_type = command.command_type.as_str().to_string();
    match transport.send(device, command) {
        Ok(message) => DeviceOutcome {
            space_device_seq: device.seq,
            device_name: device.name.clone(),
            command_type,
            result_status: DeviceResultStatus::Success,
            result_message: Some(message),
        },
        Err(TransportFault::Timeout(message)) => DeviceOutcome {
            space_device_seq: device.seq,
            device_name: device.name.clone(),
            command_type,
            result_status: DeviceResultStatus::Timeout,
            result_message: Some(message),
        },
        Err(TransportFault::Failed(message)) => DeviceOutcome {
            space_device_seq: device.seq,
            device_name: device.name.clone(),
            command_type,
            result_status: DeviceResultStatus::Fail,
            result_message: Some(message),
        },
    }
}
