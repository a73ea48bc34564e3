use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{CreatePartyInput, PartyInfo};

/// POST /parties
/// Create a party and announce it in the configured group chat. A failed
/// announcement is logged, never surfaced to the creator.
pub async fn create_party(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreatePartyInput>,
) -> Result<(StatusCode, Json<ApiResponse<PartyInfo>>), ApiError> {
    let created = state.party_service().create_party(user.id, payload).await?;

    let chat_id = state.config().read().await.telegram.chat_id;
    match (state.telegram(), chat_id) {
        (Some(telegram), Some(chat_id)) => {
            if let Err(err) = telegram.send_message(chat_id, &created.notification).await {
                tracing::warn!(error = %err, "Failed to send party notification");
            }
        }
        _ => {
            tracing::warn!("Party notification skipped, Telegram chat is not configured");
        }
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created.party))))
}

/// GET /parties/me
/// Parties the caller created or is invited to, newest first.
pub async fn list_my_parties(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<PartyInfo>>>, ApiError> {
    let parties = state.party_service().parties_for_user(user.id).await?;

    Ok(Json(ApiResponse::success(parties)))
}
