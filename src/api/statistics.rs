use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState};
use crate::services::period_service::PeriodInfo;
use crate::services::statistics_service::{
    GlobalStatistics, PlayerStatistics, UserStatistics, ZoneStatistics,
};

/// GET /statistics/me
pub async fn get_my_statistics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserStatistics>>, ApiError> {
    let stats = state.statistics_service().user_statistics(user.id).await?;

    Ok(Json(ApiResponse::success(stats)))
}

/// GET /statistics/user/{telegram_id}
pub async fn get_player_statistics(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<ApiResponse<PlayerStatistics>>, ApiError> {
    let stats = state
        .statistics_service()
        .player_statistics(telegram_id)
        .await?;

    Ok(Json(ApiResponse::success(stats)))
}

/// GET /statistics/global
pub async fn get_global_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<GlobalStatistics>>, ApiError> {
    let stats = state.statistics_service().global_statistics().await?;

    Ok(Json(ApiResponse::success(stats)))
}

/// GET /statistics/zone/{zone_id}
pub async fn get_zone_statistics(
    State(state): State<Arc<AppState>>,
    Path(zone_id): Path<String>,
) -> Result<Json<ApiResponse<ZoneStatistics>>, ApiError> {
    let stats = state.statistics_service().zone_statistics(&zone_id).await?;

    Ok(Json(ApiResponse::success(stats)))
}

/// GET /statistics/periods
/// Rotation history, newest first.
pub async fn list_periods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PeriodInfo>>>, ApiError> {
    let periods = state.period_service().list_periods().await?;

    Ok(Json(ApiResponse::success(periods)))
}
