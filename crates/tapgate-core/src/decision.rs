//! The tag-event decision engine
//!
//! Orchestrates one badge-tap event end to end: card identification,
//! status gate, building permission gate, enter/exit toggle, command
//! resolution, device dispatch, aggregate classification, audit write,
//! and the caller-facing response.
//!
//! Every branch, including short-circuits, writes exactly one audit
//! entry. Dispatch faults are absorbed into a FAIL aggregate so that
//! the audit write always runs; the only propagated failure past the
//! dispatch step is the audit store itself being unavailable.

use crate::aggregate;
use crate::errors::{Result, TgError, TgErrorKind};
use crate::model::{
    Card, CardStatus, ControlResult, ControlSummary, DispatchReport, LogType, NewAccessLogEntry,
    ReaderContext,
};
use crate::policy;
use crate::ports::{
    AuditLog, CardDirectory, DeviceDispatcher, MappingSource, PermissionOracle, SpaceDirectory,
    UserDirectory,
};
use crate::toggle::{self, Direction};
use serde::{Deserialize, Serialize};

/// One inbound tag event as presented by a reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEvent {
    /// Raw tag identifier
    pub identifier: String,
    /// Optional secondary identifier
    #[serde(default)]
    pub aid: Option<String>,
}

/// Caller-facing terminal result of a tag event
///
/// Mirrors the terminal state of the decision: a FAIL aggregate is
/// surfaced as FAIL, never silently reported as SUCCESS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagResult {
    Unknown,
    Denied,
    Success,
    Partial,
    Fail,
}

impl TagResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagResult::Unknown => "UNKNOWN",
            TagResult::Denied => "DENIED",
            TagResult::Success => "SUCCESS",
            TagResult::Partial => "PARTIAL",
            TagResult::Fail => "FAIL",
        }
    }
}

/// The response returned to the reader for one tag event
///
/// Carries display names and the aggregate summary for the caller's
/// convenience; the raw per-device detail stays in the audit store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagOutcome {
    pub result: TagResult,
    pub log_type: LogType,
    pub space_name: String,
    pub user_name: Option<String>,
    pub control_result: Option<ControlResult>,
    pub control_summary: Option<ControlSummary>,
    pub message: String,
}

/// The decision engine: pure orchestration over collaborator ports
pub struct DecisionEngine<'a> {
    pub cards: &'a dyn CardDirectory,
    pub permissions: &'a dyn PermissionOracle,
    pub spaces: &'a dyn SpaceDirectory,
    pub users: &'a dyn UserDirectory,
    pub mappings: &'a dyn MappingSource,
    pub audit: &'a dyn AuditLog,
    pub dispatcher: &'a dyn DeviceDispatcher,
}

impl<'a> DecisionEngine<'a> {
    /// Process one tag event to its terminal state
    ///
    /// Exactly one audit entry is appended on every path that returns
    /// `Ok`. An `Err` return means the event could not be accepted for
    /// processing (collaborator store failure) and is surfaced as an
    /// operational error to the caller.
    pub fn process(&self, reader: &ReaderContext, event: &TagEvent) -> Result<TagOutcome> {
        let space = self.spaces.find_space(reader.space_seq)?;
        let space_name = space.as_ref().map(|s| s.name.clone()).unwrap_or_default();

        // Step 1: identify
        let card = match self.cards.find_by_identifier(&event.identifier)? {
            Some(card) => card,
            None => {
                self.audit.append(&NewAccessLogEntry::unknown(
                    reader.reader_seq,
                    reader.space_seq,
                    event.identifier.clone(),
                    event.aid.clone(),
                ))?;
                return Ok(TagOutcome {
                    result: TagResult::Unknown,
                    log_type: LogType::Unknown,
                    space_name,
                    user_name: None,
                    control_result: None,
                    control_summary: None,
                    message: "Unregistered card".to_string(),
                });
            }
        };

        // Step 2: status gate. The cause is distinguished only in the
        // human-readable message, not in the persisted log type.
        match card.status {
            CardStatus::Inactive => {
                return self.deny(reader, event, &card, &space_name, "Card is not approved");
            }
            CardStatus::Blocked => {
                return self.deny(reader, event, &card, &space_name, "Card is blocked");
            }
            CardStatus::Active => {}
        }

        // Step 3: permission gate
        let building_seq = space.as_ref().and_then(|s| s.building_seq);
        let building_seq = match building_seq {
            Some(seq) => seq,
            None => {
                tracing::error!(
                    space_seq = reader.space_seq,
                    reader_seq = reader.reader_seq,
                    "space has no building association"
                );
                return self.deny(reader, event, &card, &space_name, "Space configuration error");
            }
        };

        if !self
            .permissions
            .has_building_permission(card.user_seq, building_seq)?
        {
            return self.deny(
                reader,
                event,
                &card,
                &space_name,
                "No access permission for this building",
            );
        }

        // Step 4: toggle
        let direction = toggle::resolve_next_direction(self.audit, reader.reader_seq, card.seq)?;

        // Step 5: dispatch. One batch call; an empty batch skips the
        // device layer entirely.
        let bindings = policy::resolve_commands(
            self.mappings,
            reader.reader_seq,
            reader.space_seq,
            direction,
        )?;

        let dispatched = if bindings.is_empty() {
            Ok(DispatchReport::empty())
        } else {
            self.dispatcher.execute(&bindings, card.user_seq)
        };

        // Step 6: aggregate. A dispatcher fault degrades to a FAIL
        // outcome; it must not escape before the audit write.
        let (control_result, control_summary, control_detail) = match dispatched {
            Ok(report) => {
                let detail = serde_json::to_string(&report.results).map_err(|e| {
                    TgError::new(TgErrorKind::Serialization)
                        .with_op("process_tag")
                        .with_message(e.to_string())
                })?;
                (
                    aggregate::classify(&report),
                    Some(aggregate::summarize(&report)),
                    Some(detail),
                )
            }
            Err(err) => {
                tracing::error!(
                    reader_seq = reader.reader_seq,
                    error = %err,
                    "device dispatch failed"
                );
                let detail =
                    serde_json::json!([{ "error": err.to_string() }]).to_string();
                (ControlResult::Fail, None, Some(detail))
            }
        };

        // Step 7: persist
        let log_type = direction.log_type();
        self.audit.append(&NewAccessLogEntry {
            reader_seq: reader.reader_seq,
            card_seq: Some(card.seq),
            user_seq: Some(card.user_seq),
            space_seq: reader.space_seq,
            log_type,
            tag_identifier: event.identifier.clone(),
            tag_aid: event.aid.clone(),
            control_result: Some(control_result),
            control_detail,
        })?;

        // Step 8: respond
        let user_name = self.users.user_name(card.user_seq)?;
        let result = match control_result {
            ControlResult::Success | ControlResult::Skipped => TagResult::Success,
            ControlResult::Partial => TagResult::Partial,
            ControlResult::Fail => TagResult::Fail,
        };
        let message = match direction {
            Direction::Enter => format!("Checked in to {}", space_name),
            Direction::Exit => format!("Checked out of {}", space_name),
        };

        Ok(TagOutcome {
            result,
            log_type,
            space_name,
            user_name,
            control_result: Some(control_result),
            control_summary,
            message,
        })
    }

    /// Terminal DENIED: append the audit entry, resolve the user's
    /// display name, and build the response
    fn deny(
        &self,
        reader: &ReaderContext,
        event: &TagEvent,
        card: &Card,
        space_name: &str,
        message: &str,
    ) -> Result<TagOutcome> {
        self.audit.append(&NewAccessLogEntry::denied(
            reader.reader_seq,
            reader.space_seq,
            card.seq,
            card.user_seq,
            event.identifier.clone(),
            event.aid.clone(),
        ))?;

        let user_name = self.users.user_name(card.user_seq)?;

        Ok(TagOutcome {
            result: TagResult::Denied,
            log_type: LogType::Denied,
            space_name: space_name.to_string(),
            user_name,
            control_result: None,
            control_summary: None,
            message: message.to_string(),
        })
    }
}
