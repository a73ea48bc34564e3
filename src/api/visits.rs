use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::VisitRecord;

/// GET /visits/me
/// The caller's completions in the current period, newest first.
pub async fn list_my_visits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<VisitRecord>>>, ApiError> {
    let visits = state.visit_service().visits_for_user(user.id).await?;

    Ok(Json(ApiResponse::success(visits)))
}

/// POST /visits/{zone_id}
/// Mark the zone completed for the current period.
pub async fn mark_visit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(zone_id): Path<String>,
) -> Result<Json<ApiResponse<VisitRecord>>, ApiError> {
    let visit = state.visit_service().mark_visit(user.id, &zone_id).await?;

    Ok(Json(ApiResponse::success(visit)))
}

/// DELETE /visits/{zone_id}
/// Free the period slot again. All-time counters are unaffected.
pub async fn remove_visit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(zone_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .visit_service()
        .remove_visit(user.id, &zone_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Visit removed",
    ))))
}
