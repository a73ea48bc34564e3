use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, CreateCharacterRequest, UpdateCharacterRequest};
use crate::services::{CharacterInfo, CharacterPatch};

/// GET /characters
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<CharacterInfo>>>, ApiError> {
    let characters = state.character_service().list_characters(user.id).await?;

    Ok(Json(ApiResponse::success(characters)))
}

/// POST /characters
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CharacterInfo>>), ApiError> {
    let character = state
        .character_service()
        .create_character(user.id, &payload.nickname, &payload.profession, payload.level)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(character))))
}

/// PUT /characters/{id}
/// Update an owned character; someone else's id reads as not found.
pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCharacterRequest>,
) -> Result<Json<ApiResponse<CharacterInfo>>, ApiError> {
    let patch = CharacterPatch {
        nickname: payload.nickname,
        profession: payload.profession,
        level: payload.level,
    };

    let character = state
        .character_service()
        .update_character(id, user.id, patch)
        .await?;

    Ok(Json(ApiResponse::success(character)))
}

/// DELETE /characters/{id}
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.character_service().delete_character(id, user.id).await?;

    Ok(Json(ApiResponse::success(())))
}
