use serde::{Deserialize, Serialize};

use crate::entities::zones;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Instance zone as served by the catalog endpoints.
#[derive(Debug, Serialize)]
pub struct ZoneDto {
    pub zone_id: String,
    pub name: String,
    pub boss_name: Option<String>,
    pub level: Option<i32>,
    pub description: Option<String>,
}

impl From<zones::Model> for ZoneDto {
    fn from(model: zones::Model) -> Self {
        Self {
            zone_id: model.zone_id,
            name: model.name,
            boss_name: model.boss_name,
            level: model.level,
            description: model.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WebAppAuthRequest {
    pub init_data: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub telegram_id: i64,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub telegram_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub telegram_id: i64,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub telegram_id: i64,
    pub current_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub character_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    pub nickname: String,
    pub profession: String,
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCharacterRequest {
    pub nickname: Option<String>,
    pub profession: Option<String>,
    pub level: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct EnsureUserRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetLevelRequest {
    pub level: i32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database: String,
}
