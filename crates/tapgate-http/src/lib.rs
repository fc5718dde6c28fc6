//! HTTP adapter for the access-control engine
//!
//! Exposes the tag-event surface and the mapping-administration surface
//! over JSON. Tag processing runs on a blocking worker and completes
//! through the audit write even if the caller drops the connection, so
//! the device state and the audit trail never diverge from what the
//! reader assumes happened.

#![forbid(unsafe_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use rusqlite::Connection;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tapgate_core::errors::{TgError, TgErrorKind};
use tapgate_core::model::MappingSpec;
use tapgate_core::TagEvent;
use tapgate_core_types::RequestId;
use tapgate_engine::commands;
use tapgate_engine::{NfcDispatcher, TcpTransport};

/// Header carrying the reader's API key
pub const API_KEY_HEADER: &str = "x-nfc-api-key";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub transport: Arc<TcpTransport>,
    pub dispatch_deadline: Duration,
}

impl AppState {
    pub fn new(conn: Connection, dispatch_deadline: Duration) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            transport: Arc::new(TcpTransport::default()),
            dispatch_deadline,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/nfc/tag", post(tag))
        .route(
            "/nfc/readers/:reader_seq/commands",
            get(reader_commands).put(update_reader_commands),
        )
        .with_state(state)
}

type ApiResponse = (StatusCode, Json<serde_json::Value>);

fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(body) => (status, Json(body)),
        Err(e) => error_response(
            &TgError::new(TgErrorKind::Serialization).with_message(e.to_string()),
        ),
    }
}

fn error_response(err: &TgError) -> ApiResponse {
    let status = match err.kind() {
        TgErrorKind::InvalidInput | TgErrorKind::DeviceNotInSpace => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TgErrorKind::NotFound
        | TgErrorKind::Deleted
        | TgErrorKind::ReaderNotFound
        | TgErrorKind::SpaceNotFound
        | TgErrorKind::CommandNotFound => StatusCode::NOT_FOUND,
        TgErrorKind::Unauthorised => StatusCode::UNAUTHORIZED,
        TgErrorKind::Forbidden | TgErrorKind::ReaderInactive => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(serde_json::json!({
            "code": err.code(),
            "message": err.message(),
        })),
    )
}

fn lock_poisoned() -> TgError {
    TgError::new(TgErrorKind::Internal).with_message("connection lock poisoned")
}

fn join_failed() -> TgError {
    TgError::new(TgErrorKind::Internal).with_message("worker task failed")
}

async fn healthz() -> ApiResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// POST /nfc/tag — process one badge-tap event
async fn tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<TagEvent>,
) -> ApiResponse {
    let Some(api_key) = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return error_response(
            &TgError::new(TgErrorKind::Unauthorised).with_message("API key not provided"),
        );
    };

    let request_id = RequestId::new();
    tracing::debug!(request_id = %request_id, "tag event accepted");

    // spawn_blocking detaches the event from the connection's fate: an
    // accepted tap runs through its audit write even if the caller goes
    // away
    let result = tokio::task::spawn_blocking(move || {
        let conn = state.db.lock().map_err(|_| lock_poisoned())?;
        let reader = commands::resolve_reader(&conn, &api_key)?;
        let dispatcher =
            NfcDispatcher::new(&conn, Arc::clone(&state.transport), state.dispatch_deadline);
        commands::process_tag(&conn, &dispatcher, &reader, &event)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => json_response(StatusCode::OK, &outcome),
        Ok(Err(err)) => error_response(&err),
        Err(_) => error_response(&join_failed()),
    }
}

/// GET /nfc/readers/{reader_seq}/commands — administrative mapping view
async fn reader_commands(
    State(state): State<AppState>,
    Path(reader_seq): Path<i64>,
) -> ApiResponse {
    let result = tokio::task::spawn_blocking(move || {
        let conn = state.db.lock().map_err(|_| lock_poisoned())?;
        commands::get_reader_commands(&conn, reader_seq)
    })
    .await;

    match result {
        Ok(Ok(view)) => json_response(StatusCode::OK, &view),
        Ok(Err(err)) => error_response(&err),
        Err(_) => error_response(&join_failed()),
    }
}

/// Body of the mapping update endpoint: exactly one of `mappings`
/// (full replace; empty array clears) or `mapAll` (auto-map)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateReaderCommandsBody {
    #[serde(default)]
    mappings: Option<Vec<MappingSpec>>,
    #[serde(default)]
    map_all: Option<bool>,
}

/// PUT /nfc/readers/{reader_seq}/commands — replace or auto-map
async fn update_reader_commands(
    State(state): State<AppState>,
    Path(reader_seq): Path<i64>,
    Json(body): Json<UpdateReaderCommandsBody>,
) -> ApiResponse {
    let result = tokio::task::spawn_blocking(move || {
        let mut conn = state.db.lock().map_err(|_| lock_poisoned())?;

        match (body.map_all.unwrap_or(false), body.mappings) {
            (true, None) => commands::auto_map_all(&mut conn, reader_seq),
            (false, Some(specs)) => commands::replace_mappings(&mut conn, reader_seq, &specs),
            _ => Err(TgError::new(TgErrorKind::InvalidInput)
                .with_op("update_reader_commands")
                .with_message("Exactly one of mappings or mapAll must be provided")),
        }
    })
    .await;

    match result {
        Ok(Ok(summary)) => json_response(StatusCode::OK, &summary),
        Ok(Err(err)) => error_response(&err),
        Err(_) => error_response(&join_failed()),
    }
}
