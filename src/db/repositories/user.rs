use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{characters, users};

/// Display metadata carried by a Telegram auth payload.
#[derive(Debug, Clone, Default)]
pub struct UserMetadata {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by telegram id")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        users::Entity::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")
    }

    /// Create a user with default preferences (timezone UTC, language ua).
    /// Returns `None` when the Telegram id is already taken, which means a
    /// concurrent caller created the account first.
    pub async fn try_create(
        &self,
        telegram_id: i64,
        metadata: &UserMetadata,
    ) -> Result<Option<users::Model>> {
        let active = users::ActiveModel {
            telegram_id: Set(telegram_id),
            username: Set(metadata.username.clone()),
            first_name: Set(metadata.first_name.clone()),
            last_name: Set(metadata.last_name.clone()),
            timezone: Set("UTC".to_string()),
            language: Set("ua".to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Ok(None)
                } else {
                    Err(err).context("Failed to create user")
                }
            }
        }
    }

    /// Replace display metadata with the latest values observed.
    pub async fn overwrite_metadata(
        &self,
        user: users::Model,
        metadata: &UserMetadata,
    ) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.username = Set(metadata.username.clone());
        active.first_name = Set(metadata.first_name.clone());
        active.last_name = Set(metadata.last_name.clone());

        active
            .update(&self.conn)
            .await
            .context("Failed to update user metadata")
    }

    /// Update only the metadata fields that were supplied.
    pub async fn merge_metadata(
        &self,
        user: users::Model,
        metadata: &UserMetadata,
    ) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        if let Some(username) = &metadata.username {
            active.username = Set(Some(username.clone()));
        }
        if let Some(first_name) = &metadata.first_name {
            active.first_name = Set(Some(first_name.clone()));
        }
        if let Some(last_name) = &metadata.last_name {
            active.last_name = Set(Some(last_name.clone()));
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update user metadata")
    }

    pub async fn set_character_name(
        &self,
        user: users::Model,
        character_name: &str,
    ) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.character_name = Set(Some(character_name.to_string()));

        active
            .update(&self.conn)
            .await
            .context("Failed to update character name")
    }

    pub async fn set_character_level(&self, user: users::Model, level: i32) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.character_level = Set(Some(level));

        active
            .update(&self.conn)
            .await
            .context("Failed to update character level")
    }

    /// All users joined with their characters, for the party invite picker.
    pub async fn list_with_characters(
        &self,
    ) -> Result<Vec<(users::Model, Vec<characters::Model>)>> {
        users::Entity::find()
            .find_with_related(characters::Entity)
            .order_by_asc(users::Column::FirstName)
            .all(&self.conn)
            .await
            .context("Failed to query users with characters")
    }

    pub async fn count(&self) -> Result<u64> {
        users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    /// Verify a password against the stored Argon2 hash.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, telegram_id: i64, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let Some(password_hash) = user.password_hash else {
            return Ok(false);
        };

        let password = password.to_string();

        // Run CPU-intensive password verification in a blocking task
        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Set a new password hash and invalidate any outstanding reset code.
    pub async fn update_password(
        &self,
        user: users::Model,
        new_password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<()> {
        let password = new_password.to_string();
        let config = config.cloned();
        let new_hash = task::spawn_blocking(move || hash_password(&password, config.as_ref()))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(Some(new_hash));
        active.password_reset_code = Set(None);
        active.password_reset_expiry = Set(None);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_reset_code(
        &self,
        user: users::Model,
        code: &str,
        expiry: &str,
    ) -> Result<()> {
        let mut active: users::ActiveModel = user.into();
        active.password_reset_code = Set(Some(code.to_string()));
        active.password_reset_expiry = Set(Some(expiry.to_string()));
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default (high memory) params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a numeric password reset code (4 to 6 digits).
#[must_use]
pub fn generate_reset_code() -> String {
    use rand::Rng;

    let code: u32 = rand::rng().random_range(1000..=999_999);
    code.to_string()
}
