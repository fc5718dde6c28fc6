//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use tapgate_core::log_op_start;
/// log_op_start!("process_tag");
/// log_op_start!("process_tag", reader_seq = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = tapgate_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = tapgate_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use tapgate_core::log_op_end;
/// log_op_end!("process_tag", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = tapgate_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = tapgate_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```ignore
/// # use tapgate_core::{log_op_error, errors::{TgError, TgErrorKind}};
/// let err = TgError::new(TgErrorKind::ReaderNotFound);
/// log_op_error!("process_tag", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::TgError;
        let tg_err: TgError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = tapgate_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?tg_err.kind(),
            err_code = tg_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::TgError;
        let tg_err: TgError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = tapgate_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?tg_err.kind(),
            err_code = tg_err.code(),
            $($field)*
        );
    }};
}
