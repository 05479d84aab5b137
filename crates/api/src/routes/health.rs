//! Liveness and readiness probes.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Health probe payload.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl Health {
    fn ok() -> Self {
        Self {
            status: "ok",
            timestamp: Utc::now(),
        }
    }
}

/// Liveness health check endpoint.
///
/// GET /health
///
/// Does not check dependencies.
pub async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(Health::ok())
}

/// Readiness health check endpoint.
///
/// GET /health/ready
///
/// Verifies database connectivity; answers 503 when the database is not
/// reachable.
///
/// # Errors
///
/// Returns `AppError::Unavailable` if `SELECT 1` fails.
pub async fn readiness(State(state): State<AppState>) -> Result<ApiResponse<Health>> {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => Ok(ApiResponse::ok(Health::ok())),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            Err(AppError::Unavailable("Database unavailable".to_string()))
        }
    }
}
