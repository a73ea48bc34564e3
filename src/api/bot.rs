use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, EnsureUserRequest, MessageResponse, SetLevelRequest};
use crate::db::UserMetadata;
use crate::entities::users;
use crate::services::statistics_service::TopPlayer;
use crate::services::{UserSummary, VisitRecord};

const TOP_PLAYERS_LIMIT: usize = 10;

/// First-party bot surface. Callers are identified by path parameter with
/// no further proof, so this router is only mounted when
/// `telegram.trust_header_auth` is enabled.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bot/ensure-user", post(ensure_user))
        .route("/bot/visits/{telegram_id}", get(list_visits))
        .route("/bot/visits/{telegram_id}/{zone_id}", post(mark_visit))
        .route("/bot/visits/{telegram_id}/{zone_id}", delete(remove_visit))
        .route("/bot/user/{telegram_id}", get(get_user))
        .route("/bot/user/{telegram_id}/level", put(set_level))
        .route("/bot/top-players", get(top_players))
}

fn summary(user: &users::Model) -> UserSummary {
    UserSummary {
        id: user.id,
        telegram_id: user.telegram_id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        character_name: user.character_name.clone(),
        character_level: user.character_level,
    }
}

async fn require_user(state: &AppState, telegram_id: i64) -> Result<users::Model, ApiError> {
    state
        .store()
        .get_user_by_telegram_id(telegram_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// POST /bot/ensure-user
/// Find-or-create; metadata fields update only when supplied.
pub async fn ensure_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnsureUserRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let metadata = UserMetadata {
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };

    let user = state
        .auth_service()
        .ensure_user(payload.telegram_id, &metadata)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// GET /bot/visits/{telegram_id}
pub async fn list_visits(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<VisitRecord>>>, ApiError> {
    let visits = state
        .visit_service()
        .visits_for_telegram_user(telegram_id)
        .await?;

    Ok(Json(ApiResponse::success(visits)))
}

/// POST /bot/visits/{telegram_id}/{zone_id}
pub async fn mark_visit(
    State(state): State<Arc<AppState>>,
    Path((telegram_id, zone_id)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<VisitRecord>>, ApiError> {
    let user = require_user(&state, telegram_id).await?;
    let visit = state.visit_service().mark_visit(user.id, &zone_id).await?;

    Ok(Json(ApiResponse::success(visit)))
}

/// DELETE /bot/visits/{telegram_id}/{zone_id}
pub async fn remove_visit(
    State(state): State<Arc<AppState>>,
    Path((telegram_id, zone_id)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = require_user(&state, telegram_id).await?;
    state
        .visit_service()
        .remove_visit(user.id, &zone_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Visit removed",
    ))))
}

/// GET /bot/user/{telegram_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = require_user(&state, telegram_id).await?;

    Ok(Json(ApiResponse::success(summary(&user))))
}

/// PUT /bot/user/{telegram_id}/level
pub async fn set_level(
    State(state): State<Arc<AppState>>,
    Path(telegram_id): Path<i64>,
    Json(payload): Json<SetLevelRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = state
        .auth_service()
        .set_character_level(telegram_id, payload.level)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// GET /bot/top-players
pub async fn top_players(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TopPlayer>>>, ApiError> {
    let players = state
        .statistics_service()
        .top_players(TOP_PLAYERS_LIMIT)
        .await?;

    Ok(Json(ApiResponse::success(players)))
}
