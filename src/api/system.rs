use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthResponse, SystemStatus};

/// GET /health
/// Liveness probe outside the `/api` prefix. Reports `degraded` instead of
/// failing when the store is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = match state.store().ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::error!(error = %err, "Store ping failed");
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database = match state.store().ping().await {
        Ok(()) => "ok",
        Err(_) => "unreachable",
    };

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database: database.to_string(),
    };

    Ok(Json(ApiResponse::success(status)))
}
