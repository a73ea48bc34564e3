use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RegisterRequest, ResetPasswordRequest, SetPasswordRequest, WebAppAuthRequest,
};
use crate::db::UserMetadata;
use crate::services::{UserSummary, telegram_auth};

/// Identity of the authenticated caller, attached to the request by
/// [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i32,
    pub telegram_id: i64,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that accepts:
/// 1. `X-Telegram-Init-Data` header carrying a signed Web-App payload
/// 2. `X-Telegram-Id` header, only when `telegram.trust_header_auth` is on
///
/// The signed path resolves (and on first sight creates) the account; the
/// trusted header resolves existing accounts only.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (bot_token, trust_header_auth) = {
        let config = state.config().read().await;
        (
            config.telegram.bot_token.clone(),
            config.telegram.trust_header_auth,
        )
    };

    if let Some(raw) = headers
        .get("X-Telegram-Init-Data")
        .and_then(|value| value.to_str().ok())
    {
        if bot_token.is_empty() {
            return Err(ApiError::internal("Telegram bot token is not configured"));
        }

        let identity =
            telegram_auth::verify_init_data(&bot_token, raw, chrono::Utc::now().timestamp())?;
        let user = state.auth_service().resolve_identity(&identity).await?;

        tracing::Span::current().record("user_id", user.telegram_id);
        request.extensions_mut().insert(CurrentUser {
            id: user.id,
            telegram_id: user.telegram_id,
        });
        return Ok(next.run(request).await);
    }

    if trust_header_auth
        && let Some(telegram_id) = headers
            .get("X-Telegram-Id")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.parse::<i64>().ok())
    {
        // No proof behind this header, so never create an account from it.
        if let Some(user) = state.store().get_user_by_telegram_id(telegram_id).await? {
            tracing::Span::current().record("user_id", user.telegram_id);
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                telegram_id: user.telegram_id,
            });
            return Ok(next.run(request).await);
        }
    }

    Err(ApiError::Unauthorized("Authentication required".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

async fn require_bot_token(state: &AppState) -> Result<String, ApiError> {
    let bot_token = state.config().read().await.telegram.bot_token.clone();
    if bot_token.is_empty() {
        return Err(ApiError::internal("Telegram bot token is not configured"));
    }
    Ok(bot_token)
}

/// POST /auth/telegram
/// Verify a Login Widget payload and resolve the account behind it.
pub async fn telegram_login(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let bot_token = require_bot_token(&state).await?;

    let identity = telegram_auth::verify_login_widget(
        &bot_token,
        &fields,
        chrono::Utc::now().timestamp(),
    )?;
    let user = state.auth_service().resolve_identity(&identity).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/webapp
/// Verify a Web-App `initData` blob and resolve the account behind it.
pub async fn webapp_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebAppAuthRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    if payload.init_data.is_empty() {
        return Err(ApiError::validation("initData is required"));
    }
    let bot_token = require_bot_token(&state).await?;

    let identity = telegram_auth::verify_init_data(
        &bot_token,
        &payload.init_data,
        chrono::Utc::now().timestamp(),
    )?;
    let user = state.auth_service().resolve_identity(&identity).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/register
/// Create an account with a password.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let metadata = UserMetadata {
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };

    let user = state
        .auth_service()
        .register(payload.telegram_id, &payload.password, &metadata)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Verify a password login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .auth_service()
        .login(payload.telegram_id, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/forgot-password
/// Issue a reset code and deliver it over the bot chat. The code itself
/// never appears in the response.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let Some(telegram) = state.telegram() else {
        return Err(ApiError::internal("Telegram bot is not configured"));
    };

    let code = state
        .auth_service()
        .forgot_password(payload.telegram_id)
        .await?;

    let text = format!(
        "🔐 Код відновлення паролю: <code>{code}</code>\nВведіть його в застосунку, щоб встановити новий пароль."
    );
    telegram
        .send_message(payload.telegram_id, &text)
        .await
        .map_err(|err| ApiError::telegram_error(err.to_string()))?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reset code sent",
    ))))
}

/// POST /auth/reset-password
/// Exchange a valid reset code for a new password.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .reset_password(payload.telegram_id, &payload.code, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated",
    ))))
}

/// POST /auth/set-password
/// Set a password, proving knowledge of the current one when set.
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .set_password(
            payload.telegram_id,
            payload.current_password.as_deref(),
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated",
    ))))
}
