//! Domain service for Telegram identity resolution and account management.
//!
//! Every caller is keyed by Telegram id. Verified auth payloads carry the
//! freshest display metadata, so resolution overwrites what is stored;
//! the trusted bot path merges instead, keeping known values when the
//! bot sends blanks. Passwords are an optional extra on top of Telegram
//! auth.

use serde::Serialize;
use thiserror::Error;

use crate::db::UserMetadata;
use crate::services::character_service::CharacterInfo;
use crate::services::telegram_auth::TelegramIdentity;

/// Errors specific to identity and account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired reset code")]
    InvalidResetCode,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User DTO for auth responses. Carries the internal id so callers can
/// address party invites and roster lookups without another query.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub character_name: Option<String>,
    pub character_level: Option<i32>,
}

/// Full profile DTO. Password material never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub character_name: Option<String>,
    pub character_level: Option<i32>,
    pub timezone: String,
    pub language: String,
    pub created_at: String,
}

/// A player with their roster, for the user directory.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerListing {
    pub id: i32,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub characters: Vec<CharacterInfo>,
}

/// Domain service trait for identity and accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Finds or creates the account behind a verified Telegram identity.
    /// Stored display metadata is replaced with the payload's values.
    async fn resolve_identity(
        &self,
        identity: &TelegramIdentity,
    ) -> Result<UserSummary, AuthError>;

    /// Find-or-create for trusted bot calls. Only metadata fields present
    /// in the payload are applied; known values survive blanks.
    async fn ensure_user(
        &self,
        telegram_id: i64,
        metadata: &UserMetadata,
    ) -> Result<UserSummary, AuthError>;

    /// Creates an account with a password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserAlreadyExists`] when the Telegram id is
    /// already registered, [`AuthError::Validation`] for a weak password.
    async fn register(
        &self,
        telegram_id: i64,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<UserSummary, AuthError>;

    /// Verifies a password login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the account is
    /// unknown, has no password, or the password does not match.
    async fn login(&self, telegram_id: i64, password: &str) -> Result<UserSummary, AuthError>;

    /// Issues a short-lived numeric reset code and returns it for
    /// delivery over the bot channel. The code never goes into an HTTP
    /// response.
    async fn forgot_password(&self, telegram_id: i64) -> Result<String, AuthError>;

    /// Sets a new password in exchange for a valid reset code. The code
    /// is consumed on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidResetCode`] for a wrong, expired, or
    /// already used code.
    async fn reset_password(
        &self,
        telegram_id: i64,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Sets a password directly. When one is already set, the current
    /// password must be supplied and match.
    async fn set_password(
        &self,
        telegram_id: i64,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Profile of an already resolved user.
    async fn get_profile(&self, user_id: i32) -> Result<ProfileInfo, AuthError>;

    /// Updates the display character name on the profile.
    async fn update_character_name(
        &self,
        user_id: i32,
        character_name: &str,
    ) -> Result<ProfileInfo, AuthError>;

    /// Sets the character level, looked up by Telegram id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when the level is outside 1..=100.
    async fn set_character_level(
        &self,
        telegram_id: i64,
        level: i32,
    ) -> Result<UserSummary, AuthError>;

    /// Every player with their character roster.
    async fn list_players(&self) -> Result<Vec<PlayerListing>, AuthError>;
}
