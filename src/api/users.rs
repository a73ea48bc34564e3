use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::PlayerListing;

/// GET /users
/// The player directory with each player's roster, as used by the
/// party-invite picker.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PlayerListing>>>, ApiError> {
    let players = state.auth_service().list_players().await?;

    Ok(Json(ApiResponse::success(players)))
}
