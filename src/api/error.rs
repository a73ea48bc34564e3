use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{
    AuthError, CharacterError, PartyError, PeriodError, StatisticsError, TelegramAuthError,
    VisitError,
};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ExternalApiError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} service is unavailable", service),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<TelegramAuthError> for ApiError {
    fn from(err: TelegramAuthError) -> Self {
        match err {
            TelegramAuthError::InvalidSignature | TelegramAuthError::Expired => {
                ApiError::Unauthorized(err.to_string())
            }
            TelegramAuthError::MissingHash
            | TelegramAuthError::MissingUser
            | TelegramAuthError::MissingUserId
            | TelegramAuthError::MalformedUser => ApiError::ValidationError(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::UserAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidResetCode => ApiError::ValidationError(err.to_string()),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<VisitError> for ApiError {
    fn from(err: VisitError) -> Self {
        match err {
            VisitError::ZoneNotFound | VisitError::VisitNotFound | VisitError::UserNotFound => {
                ApiError::NotFound(err.to_string())
            }
            VisitError::AlreadyVisited => ApiError::Conflict(err.to_string()),
            VisitError::Database(msg) => ApiError::DatabaseError(msg),
            VisitError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<StatisticsError> for ApiError {
    fn from(err: StatisticsError) -> Self {
        match err {
            StatisticsError::UserNotFound | StatisticsError::ZoneNotFound => {
                ApiError::NotFound(err.to_string())
            }
            StatisticsError::Database(msg) => ApiError::DatabaseError(msg),
            StatisticsError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<CharacterError> for ApiError {
    fn from(err: CharacterError) -> Self {
        match err {
            CharacterError::CharacterNotFound => ApiError::NotFound(err.to_string()),
            CharacterError::Validation(msg) => ApiError::ValidationError(msg),
            CharacterError::Database(msg) => ApiError::DatabaseError(msg),
            CharacterError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::ZoneNotFound => ApiError::NotFound(err.to_string()),
            PartyError::Validation(msg) => ApiError::ValidationError(msg),
            PartyError::Database(msg) => ApiError::DatabaseError(msg),
            PartyError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::Database(msg) => ApiError::DatabaseError(msg),
            PeriodError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    pub fn telegram_error(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Telegram".to_string(),
            message: msg.into(),
        }
    }
}
