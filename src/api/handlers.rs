use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::check::{
    CheckError, CheckParams, CheckReport, ReputationChecker, ReputationReport, TimeoutChecker,
};

/// Application state shared across handlers
pub struct AppState {
    pub timeout: TimeoutChecker,
    pub reputation: ReputationChecker,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Send Logging
// ============================================================================

#[derive(Deserialize)]
pub struct LogSendRequest {
    pub to: String,
    pub region: String,
}

#[derive(Serialize)]
pub struct LogSendResponse {
    pub logged: bool,
}

pub async fn log_send(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogSendRequest>,
) -> Result<Json<LogSendResponse>, ApiError> {
    state.timeout.log_send(&request.to, &request.region).await?;

    Ok(Json(LogSendResponse { logged: true }))
}

// ============================================================================
// Checks
// ============================================================================

pub async fn timeout_check(
    State(state): State<Arc<AppState>>,
    Json(params): Json<CheckParams>,
) -> Result<Json<CheckReport>, ApiError> {
    let report = state.timeout.run(&params).await?;

    Ok(Json(report))
}

pub async fn reputation_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReputationReport>, ApiError> {
    let report = state.reputation.run().await?;

    Ok(Json(report))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(String),
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Config(_) | CheckError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            CheckError::Store(_) | CheckError::Provider(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
