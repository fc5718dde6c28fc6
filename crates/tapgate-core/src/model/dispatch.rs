//! Dispatch value types
//!
//! The decision engine hands the dispatcher a batch of command bindings
//! and receives per-device outcomes back. TIMEOUT is carried distinctly
//! in the outcome detail but counts as a failure for aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One resolved (device, command) pair to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBinding {
    pub space_device_seq: i64,
    pub command_seq: i64,
}

/// Per-device execution status as reported by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceResultStatus {
    Success,
    Fail,
    Timeout,
}

impl DeviceResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceResultStatus::Success => "SUCCESS",
            DeviceResultStatus::Fail => "FAIL",
            DeviceResultStatus::Timeout => "TIMEOUT",
        }
    }

    /// TIMEOUT is treated identically to FAIL for aggregation purposes
    pub fn is_failure(&self) -> bool {
        !matches!(self, DeviceResultStatus::Success)
    }
}

impl fmt::Display for DeviceResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One device's outcome within a dispatched batch
///
/// Serialized as-is into the audit entry's control detail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOutcome {
    pub space_device_seq: i64,
    pub device_name: String,
    pub command_type: String,
    pub result_status: DeviceResultStatus,
    pub result_message: Option<String>,
}

/// The dispatcher's aggregate report for one batch call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchReport {
    pub results: Vec<DeviceOutcome>,
    pub success_count: usize,
    pub fail_count: usize,
}

impl DispatchReport {
    /// Report for an empty batch (nothing to dispatch)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a report from outcomes, deriving the counters
    pub fn from_outcomes(results: Vec<DeviceOutcome>) -> Self {
        let success_count = results
            .iter()
            .filter(|r| r.result_status == DeviceResultStatus::Success)
            .count();
        let fail_count = results.len() - success_count;
        Self {
            results,
            success_count,
            fail_count,
        }
    }
}

/// The caller-facing roll-up of a dispatch; per-device detail stays in
/// the audit store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSummary {
    pub total_devices: usize,
    pub success_count: usize,
    pub fail_count: usize,
}

impl ControlSummary {
    pub fn of(report: &DispatchReport) -> Self {
        Self {
            total_devices: report.results.len(),
            success_count: report.success_count,
            fail_count: report.fail_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: DeviceResultStatus) -> DeviceOutcome {
        DeviceOutcome {
            space_device_seq: 1,
            device_name: "Display".to_string(),
            command_type: "POWER_ON".to_string(),
            result_status: status,
            result_message: None,
        }
    }

    #[test]
    fn test_from_outcomes_counts() {
        let report = DispatchReport::from_outcomes(vec![
            outcome(DeviceResultStatus::Success),
            outcome(DeviceResultStatus::Fail),
            outcome(DeviceResultStatus::Timeout),
        ]);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.fail_count, 2);
    }

    #[test]
    fn test_timeout_is_failure() {
        assert!(DeviceResultStatus::Timeout.is_failure());
        assert!(DeviceResultStatus::Fail.is_failure());
        assert!(!DeviceResultStatus::Success.is_failure());
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let json = serde_json::to_string(&outcome(DeviceResultStatus::Timeout)).unwrap();
        assert!(json.contains("\"spaceDeviceSeq\":1"));
        assert!(json.contains("\"resultStatus\":\"TIMEOUT\""));
    }

    #[test]
    fn test_summary_of_report() {
        let report = DispatchReport::from_outcomes(vec![
            outcome(DeviceResultStatus::Success),
            outcome(DeviceResultStatus::Success),
        ]);
        let summary = ControlSummary::of(&report);
        assert_eq!(summary.total_devices, 2);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.fail_count, 0);
    }
}
