use tapgate_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using TgError
pub type Result<T> = std::result::Result<T, TgError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in the TapGate system. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and external API responses.
///
/// Note that an unknown tag identifier and a denied card are NOT errors:
/// both are modeled as data (a terminal decision outcome) so that every
/// accepted tag event produces a deterministic, loggable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TgErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    Deleted,

    // Entity lookups
    ReaderNotFound,
    ReaderInactive,
    SpaceNotFound,
    DeviceNotInSpace,
    CommandNotFound,

    // Audit log
    /// The append-only access log could not be written; the one fatal
    /// condition for an accepted tag event
    AuditUnavailable,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Dispatch,
    Timeout,

    // Auth
    Unauthorised,
    Forbidden,

    // Internal
    Internal,
}

impl TgErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            TgErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            TgErrorKind::NotFound => "ERR_NOT_FOUND",
            TgErrorKind::Deleted => "ERR_DELETED",
            TgErrorKind::ReaderNotFound => "ERR_READER_NOT_FOUND",
            TgErrorKind::ReaderInactive => "ERR_READER_INACTIVE",
            TgErrorKind::SpaceNotFound => "ERR_SPACE_NOT_FOUND",
            TgErrorKind::DeviceNotInSpace => "ERR_DEVICE_NOT_IN_SPACE",
            TgErrorKind::CommandNotFound => "ERR_COMMAND_NOT_FOUND",
            TgErrorKind::AuditUnavailable => "ERR_AUDIT_UNAVAILABLE",
            TgErrorKind::Io => "ERR_IO",
            TgErrorKind::Serialization => "ERR_SERIALIZATION",
            TgErrorKind::Persistence => "ERR_PERSISTENCE",
            TgErrorKind::Dispatch => "ERR_DISPATCH",
            TgErrorKind::Timeout => "ERR_TIMEOUT",
            TgErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            TgErrorKind::Forbidden => "ERR_FORBIDDEN",
            TgErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for
/// debugging.
#[derive(Debug, Clone)]
pub struct TgError {
    kind: TgErrorKind,
    op: Option<String>,
    entity: Option<String>,
    reader_seq: Option<i64>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl TgError {
    /// Create a new error with the specified kind
    pub fn new(kind: TgErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            reader_seq: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (e.g. "device:42", "command:7")
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add reader context
    pub fn with_reader_seq(mut self, reader_seq: i64) -> Self {
        self.reader_seq = Some(reader_seq);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> TgErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the reader context, if any
    pub fn reader_seq(&self) -> Option<i64> {
        self.reader_seq
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for TgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(reader_seq) = self.reader_seq {
            write!(f, " (reader_seq: {})", reader_seq)?;
        }
        Ok(())
    }
}

impl std::error::Error for TgError {}

// ========== End Error Facility ==========

/// Domain error taxonomy with rich per-variant messages
///
/// These variants cover the validation failures of the administrative
/// mapping surface and the lookup failures of the tag-processing path.
/// All of them convert into [`TgError`] for uniform handling at the
/// operation boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Reader not found (or soft-deleted)
    #[error("Reader not found: {reader_seq}")]
    ReaderNotFound { reader_seq: i64 },

    /// Reader exists but is administratively inactive
    #[error("Reader is inactive: {reader_seq}")]
    ReaderInactive { reader_seq: i64 },

    /// The space a reader is installed in could not be resolved
    #[error("Space not found: {space_seq}")]
    SpaceNotFound { space_seq: i64 },

    /// A mapping references a device outside the reader's space
    #[error("Device {device_seq} does not belong to the reader's space")]
    DeviceNotInSpace { device_seq: i64 },

    /// A mapping references a command that does not exist or is deleted
    #[error("Command not found: {command_seq}")]
    CommandNotFound { command_seq: i64 },

    /// Malformed administrative request
    #[error("Invalid mapping request: {reason}")]
    InvalidMappingRequest { reason: String },
}

impl From<DomainError> for TgError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::ReaderNotFound { reader_seq } => TgError::new(TgErrorKind::ReaderNotFound)
                .with_reader_seq(reader_seq)
                .with_message(message),
            DomainError::ReaderInactive { reader_seq } => TgError::new(TgErrorKind::ReaderInactive)
                .with_reader_seq(reader_seq)
                .with_message(message),
            DomainError::SpaceNotFound { space_seq } => TgError::new(TgErrorKind::SpaceNotFound)
                .with_entity(format!("space:{}", space_seq))
                .with_message(message),
            DomainError::DeviceNotInSpace { device_seq } => {
                TgError::new(TgErrorKind::DeviceNotInSpace)
                    .with_entity(format!("device:{}", device_seq))
                    .with_message(message)
            }
            DomainError::CommandNotFound { command_seq } => {
                TgError::new(TgErrorKind::CommandNotFound)
                    .with_entity(format!("command:{}", command_seq))
                    .with_message(message)
            }
            DomainError::InvalidMappingRequest { .. } => {
                TgError::new(TgErrorKind::InvalidInput).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(TgErrorKind::NotFound.code(), "ERR_NOT_FOUND");
        assert_eq!(TgErrorKind::DeviceNotInSpace.code(), "ERR_DEVICE_NOT_IN_SPACE");
        assert_eq!(TgErrorKind::AuditUnavailable.code(), "ERR_AUDIT_UNAVAILABLE");
    }

    #[test]
    fn test_builder_context() {
        let err = TgError::new(TgErrorKind::CommandNotFound)
            .with_op("replace_mappings")
            .with_entity("command:7")
            .with_reader_seq(3)
            .with_message("Command not found: 7");

        assert_eq!(err.kind(), TgErrorKind::CommandNotFound);
        assert_eq!(err.op(), Some("replace_mappings"));
        assert_eq!(err.entity(), Some("command:7"));
        assert_eq!(err.reader_seq(), Some(3));

        let display = err.to_string();
        assert!(display.contains("ERR_COMMAND_NOT_FOUND"));
        assert!(display.contains("replace_mappings"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: TgError = DomainError::DeviceNotInSpace { device_seq: 42 }.into();
        assert_eq!(err.kind(), TgErrorKind::DeviceNotInSpace);
        assert_eq!(err.entity(), Some("device:42"));
        assert!(err.message().contains("42"));
    }

    #[test]
    fn test_domain_error_invalid_request() {
        let err: TgError = DomainError::InvalidMappingRequest {
            reason: "either mappings or mapAll must be provided".to_string(),
        }
        .into();
        assert_eq!(err.kind(), TgErrorKind::InvalidInput);
    }
}
