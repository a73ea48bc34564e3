//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Store, UserMetadata, generate_reset_code};
use crate::entities::users;
use crate::services::auth_service::{
    AuthError, AuthService, PlayerListing, ProfileInfo, UserSummary,
};
use crate::services::character_service::CharacterInfo;
use crate::services::telegram_auth::TelegramIdentity;
use async_trait::async_trait;

const MIN_PASSWORD_LEN: usize = 6;
const RESET_CODE_TTL_MINUTES: i64 = 15;

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn to_summary(user: &users::Model) -> UserSummary {
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

fn to_profile(user: &users::Model) -> ProfileInfo {
    ProfileInfo {
        telegram_id: user.telegram_id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        character_name: user.character_name.clone(),
        character_level: user.character_level,
        timezone: user.timezone.clone(),
        language: user.language.clone(),
        created_at: user.created_at.clone(),
    }
}

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn require_user(&self, telegram_id: i64) -> Result<users::Model, AuthError> {
        self.store
            .get_user_by_telegram_id(telegram_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn resolve_identity(
        &self,
        identity: &TelegramIdentity,
    ) -> Result<UserSummary, AuthError> {
        let metadata = UserMetadata {
            username: identity.username.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
        };

        let user = match self.store.get_user_by_telegram_id(identity.id).await? {
            Some(existing) => {
                self.store
                    .overwrite_user_metadata(existing, &metadata)
                    .await?
            }
            None => match self.store.try_create_user(identity.id, &metadata).await? {
                Some(created) => {
                    tracing::info!(telegram_id = identity.id, "Created user from Telegram auth");
                    created
                }
                // Lost a create race; the winner's row takes the fresh
                // metadata instead.
                None => {
                    let existing = self
                        .store
                        .get_user_by_telegram_id(identity.id)
                        .await?
                        .ok_or_else(|| {
                            AuthError::Internal(
                                "User vanished during identity resolution".to_string(),
                            )
                        })?;
                    self.store
                        .overwrite_user_metadata(existing, &metadata)
                        .await?
                }
            },
        };

        Ok(to_summary(&user))
    }

    async fn ensure_user(
        &self,
        telegram_id: i64,
        metadata: &UserMetadata,
    ) -> Result<UserSummary, AuthError> {
        let user = match self.store.get_user_by_telegram_id(telegram_id).await? {
            Some(existing) => self.store.merge_user_metadata(existing, metadata).await?,
            None => match self.store.try_create_user(telegram_id, metadata).await? {
                Some(created) => {
                    tracing::info!(telegram_id, "Created user from bot request");
                    created
                }
                None => {
                    let existing = self
                        .store
                        .get_user_by_telegram_id(telegram_id)
                        .await?
                        .ok_or_else(|| {
                            AuthError::Internal("User vanished during ensure".to_string())
                        })?;
                    self.store.merge_user_metadata(existing, metadata).await?
                }
            },
        };

        Ok(to_summary(&user))
    }

    async fn register(
        &self,
        telegram_id: i64,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<UserSummary, AuthError> {
        validate_password(password)?;

        if self
            .store
            .get_user_by_telegram_id(telegram_id)
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = self
            .store
            .try_create_user(telegram_id, metadata)
            .await?
            .ok_or(AuthError::UserAlreadyExists)?;

        let summary = to_summary(&user);
        self.store
            .update_password(user, password, Some(&self.security))
            .await?;

        tracing::info!(telegram_id, "Registered account with password");
        Ok(summary)
    }

    async fn login(&self, telegram_id: i64, password: &str) -> Result<UserSummary, AuthError> {
        // Unknown account and wrong password answer the same way.
        let user = self
            .store
            .get_user_by_telegram_id(telegram_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if user.password_hash.is_none() {
            return Err(AuthError::InvalidCredentials);
        }

        let valid = self.store.verify_password(telegram_id, password).await?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(to_summary(&user))
    }

    async fn forgot_password(&self, telegram_id: i64) -> Result<String, AuthError> {
        let user = self.require_user(telegram_id).await?;

        let code = generate_reset_code();
        let expiry =
            (chrono::Utc::now() + chrono::Duration::minutes(RESET_CODE_TTL_MINUTES)).to_rfc3339();
        self.store.set_reset_code(user, &code, &expiry).await?;

        tracing::info!(telegram_id, "Issued password reset code");
        Ok(code)
    }

    async fn reset_password(
        &self,
        telegram_id: i64,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let user = self.require_user(telegram_id).await?;

        let (Some(stored), Some(expiry)) = (
            user.password_reset_code.clone(),
            user.password_reset_expiry.clone(),
        ) else {
            return Err(AuthError::InvalidResetCode);
        };

        if stored != code {
            return Err(AuthError::InvalidResetCode);
        }

        let expires: chrono::DateTime<chrono::Utc> =
            expiry.parse().map_err(|_| AuthError::InvalidResetCode)?;
        if chrono::Utc::now() > expires {
            return Err(AuthError::InvalidResetCode);
        }

        // update_password also clears the stored code, consuming it.
        self.store
            .update_password(user, new_password, Some(&self.security))
            .await?;

        tracing::info!(telegram_id, "Password reset completed");
        Ok(())
    }

    async fn set_password(
        &self,
        telegram_id: i64,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let user = self.require_user(telegram_id).await?;

        if user.password_hash.is_some() {
            let current = current_password.ok_or(AuthError::InvalidCredentials)?;
            let valid = self.store.verify_password(telegram_id, current).await?;
            if !valid {
                return Err(AuthError::InvalidCredentials);
            }
        }

        self.store
            .update_password(user, new_password, Some(&self.security))
            .await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: i32) -> Result<ProfileInfo, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(to_profile(&user))
    }

    async fn update_character_name(
        &self,
        user_id: i32,
        character_name: &str,
    ) -> Result<ProfileInfo, AuthError> {
        let character_name = character_name.trim();
        if character_name.is_empty() {
            return Err(AuthError::Validation(
                "Character name is required".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let updated = self.store.set_character_name(user, character_name).await?;
        Ok(to_profile(&updated))
    }

    async fn set_character_level(
        &self,
        telegram_id: i64,
        level: i32,
    ) -> Result<UserSummary, AuthError> {
        if !(1..=100).contains(&level) {
            return Err(AuthError::Validation(
                "Level must be between 1 and 100".to_string(),
            ));
        }

        let user = self.require_user(telegram_id).await?;
        let updated = self.store.set_character_level(user, level).await?;
        Ok(to_summary(&updated))
    }

    async fn list_players(&self) -> Result<Vec<PlayerListing>, AuthError> {
        let rows = self.store.list_users_with_characters().await?;
        Ok(rows
            .into_iter()
            .map(|(user, characters)| PlayerListing {
                id: user.id,
                telegram_id: user.telegram_id,
                username: user.username,
                characters: characters.into_iter().map(CharacterInfo::from).collect(),
            })
            .collect())
    }
}
