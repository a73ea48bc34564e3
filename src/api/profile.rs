use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, UpdateProfileRequest};
use crate::services::ProfileInfo;

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let profile = state.auth_service().get_profile(user.id).await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /profile
/// Update the display character name; an absent field leaves it alone.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let profile = match payload.character_name {
        Some(character_name) => {
            state
                .auth_service()
                .update_character_name(user.id, &character_name)
                .await?
        }
        None => state.auth_service().get_profile(user.id).await?,
    };

    Ok(Json(ApiResponse::success(profile)))
}
