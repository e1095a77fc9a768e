use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use todo_core::types::Timestamp;

use crate::state::AppState;

fn connection_label(connected: bool) -> &'static str {
    if connected {
        "connected"
    } else {
        "disconnected"
    }
}

/// Service info payload for `GET /`.
#[derive(Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub status: &'static str,
    /// `connected` when a store handle is installed.
    pub mongodb: &'static str,
    pub timestamp: Timestamp,
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store does not answer.
    pub status: &'static str,
    /// `connected` when the installed handle answered the ping.
    pub mongodb: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET / -- liveness and service info.
async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        message: "Todo Backend API",
        status: "running",
        mongodb: connection_label(state.store.is_connected()),
        timestamp: Utc::now(),
    })
}

/// GET /health -- pings the installed store handle without reconnecting.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match state.store.handle() {
        Some(store) => store.ping().await.is_ok(),
        None => false,
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        mongodb: connection_label(db_healthy),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Mount the root-level info and health routes (NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health_check))
}
