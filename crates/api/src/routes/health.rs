//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub sessions: SessionHealth,
    pub uploads: UploadHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Whether session tokens can be issued and checked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionHealth {
    pub keys_loaded: bool,
}

/// Whether the donation media directory exists yet. It is created on the
/// first upload, so a missing directory does not degrade the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UploadHealth {
    pub dir_present: bool,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

fn overall_status(db_connected: bool, keys_loaded: bool) -> &'static str {
    match (db_connected, keys_loaded) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        (false, _) => "unhealthy",
    }
}

/// Full health check endpoint.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;
    let keys_loaded = state.sessions.is_some();
    let dir_present = tokio::fs::metadata(state.uploads.dir())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let response = HealthResponse {
        status: overall_status(db_connected, keys_loaded).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: db_connected,
            latency_ms: db_connected.then_some(latency_ms),
        },
        sessions: SessionHealth { keys_loaded },
        uploads: UploadHealth { dir_present },
    };

    if db_connected {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Liveness probe endpoint.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    if db_connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
