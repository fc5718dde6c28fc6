#![forbid(unsafe_code)]

use std::{env, net::SocketAddr, time::Duration};

use tapgate_core::logging_facility::{self, Profile};
use tapgate_http::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging_facility::init(parse_log_profile_from_env());

    let bind = env::var("TAPGATE_HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let addr: SocketAddr = bind.parse()?;
    let db_path = env::var("TAPGATE_DB").unwrap_or_else(|_| "tapgate.db".to_string());
    let dispatch_deadline = Duration::from_millis(parse_dispatch_timeout_ms_from_env());

    let mut conn = tapgate_store::db::open(&db_path)?;
    tapgate_store::db::configure(&conn)?;
    tapgate_store::migrations::apply_migrations(&mut conn)?;

    let state = AppState::new(conn, dispatch_deadline);
    let app = router(state);

    tracing::info!(%addr, db_path = %db_path, "tapgate-http listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn parse_log_profile_from_env() -> Profile {
    match env::var("TAPGATE_LOG_PROFILE") {
        Ok(v) if v.trim().eq_ignore_ascii_case("production") => Profile::Production,
        _ => Profile::Development,
    }
}

fn parse_dispatch_timeout_ms_from_env() -> u64 {
    env::var("TAPGATE_DISPATCH_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| (100..=60_000).contains(v))
        .unwrap_or(5_000)
}
