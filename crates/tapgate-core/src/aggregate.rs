//! Aggregate classification of dispatch outcomes
//!
//! The three-way SUCCESS/FAIL/PARTIAL classification plus SKIPPED is
//! the complete result taxonomy for a batch; there is no "unknown"
//! aggregate state.

use crate::model::{ControlResult, ControlSummary, DispatchReport};

/// Classify a dispatch report
///
/// - empty results → SKIPPED (no device calls were made)
/// - no failures → SUCCESS
/// - no successes → FAIL
/// - mixed → PARTIAL
pub fn classify(report: &DispatchReport) -> ControlResult {
    if report.results.is_empty() {
        ControlResult::Skipped
    } else if report.fail_count == 0 {
        ControlResult::Success
    } else if report.success_count == 0 {
        ControlResult::Fail
    } else {
        ControlResult::Partial
    }
}

/// Roll a report up into the caller-facing summary
pub fn summarize(report: &DispatchReport) -> ControlSummary {
    ControlSummary::of(report)
}
