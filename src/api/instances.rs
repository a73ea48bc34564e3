use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ZoneDto};

/// GET /instances
/// The zone catalog, ordered by level then name.
pub async fn list_instances(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ZoneDto>>>, ApiError> {
    let zones = state.store().list_zones().await?;
    let dtos: Vec<ZoneDto> = zones.into_iter().map(ZoneDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /instances/{zone_id}
pub async fn get_instance(
    State(state): State<Arc<AppState>>,
    Path(zone_id): Path<String>,
) -> Result<Json<ApiResponse<ZoneDto>>, ApiError> {
    let zone = state
        .store()
        .get_zone_by_key(&zone_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Instance zone not found"))?;

    Ok(Json(ApiResponse::success(ZoneDto::from(zone))))
}
