//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_READER_SEQ: &str = "reader_seq";
pub const FIELD_CARD_SEQ: &str = "card_seq";
pub const FIELD_SPACE_SEQ: &str = "space_seq";
pub const FIELD_DEVICE_SEQ: &str = "device_seq";

// Decision outcome fields
pub const FIELD_LOG_TYPE: &str = "log_type";
pub const FIELD_CONTROL_RESULT: &str = "control_result";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
