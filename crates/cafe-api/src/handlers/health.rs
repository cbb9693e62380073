//! Health check endpoints for monitoring

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Timestamp of the check
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Database connectivity status
    pub database: DatabaseHealth,
    /// Process uptime in seconds
    pub uptime_seconds: u64,
}

/// Database health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseHealth {
    /// Database connection status
    pub connected: bool,
    /// Open connections
    pub pool_size: u32,
    /// Idle connections
    pub idle_connections: u32,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Service readiness status
    pub ready: bool,
    /// Timestamp of the check
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Liveness probe with database round-trip time
///
/// Returns 503 when the database does not answer.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let database = match check_database_health(&state).await {
        Ok(health) => health,
        Err(e) => {
            error!("Database health check failed: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    debug!("Health check completed in {}ms", database.response_time_ms);
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database,
        uptime_seconds: get_uptime_seconds(),
    }))
}

/// Readiness probe: 200 once the database accepts queries
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Ok(Json(ReadinessResponse {
            ready: true,
            timestamp: chrono::Utc::now(),
        })),
        Err(e) => {
            error!("Readiness check failed - database not accessible: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

async fn check_database_health(state: &AppState) -> Result<DatabaseHealth, sqlx::Error> {
    let start_time = std::time::Instant::now();

    sqlx::query("SELECT 1").execute(&state.pool).await?;

    let response_time_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(DatabaseHealth {
        connected: true,
        pool_size: state.pool.size(),
        idle_connections: u32::try_from(state.pool.num_idle()).unwrap_or(u32::MAX),
        response_time_ms,
    })
}

fn get_uptime_seconds() -> u64 {
    static START_TIME: std::sync::LazyLock<std::time::Instant> =
        std::sync::LazyLock::new(std::time::Instant::now);
    START_TIME.elapsed().as_secs()
}
