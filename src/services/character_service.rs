//! Domain service for a user's character roster.

use serde::Serialize;
use thiserror::Error;

use crate::entities::characters;

/// Errors specific to character operations.
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("Character not found")]
    CharacterNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CharacterError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CharacterError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Character DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterInfo {
    pub id: i32,
    pub nickname: String,
    pub profession: String,
    pub level: i32,
    pub created_at: String,
}

impl From<characters::Model> for CharacterInfo {
    fn from(model: characters::Model) -> Self {
        Self {
            id: model.id,
            nickname: model.nickname,
            profession: model.profession,
            level: model.level,
            created_at: model.created_at,
        }
    }
}

/// Fields of a character update; absent fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct CharacterPatch {
    pub nickname: Option<String>,
    pub profession: Option<String>,
    pub level: Option<i32>,
}

/// Domain service trait for characters. Every operation is scoped to the
/// owning user; a character id from someone else's roster reads as not
/// found.
#[async_trait::async_trait]
pub trait CharacterService: Send + Sync {
    /// The user's roster, newest first.
    async fn list_characters(&self, user_id: i32) -> Result<Vec<CharacterInfo>, CharacterError>;

    /// Adds a character.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterError::Validation`] for a blank nickname or
    /// profession, or a level outside 1..=100.
    async fn create_character(
        &self,
        user_id: i32,
        nickname: &str,
        profession: &str,
        level: i32,
    ) -> Result<CharacterInfo, CharacterError>;

    /// Applies a partial update to an owned character.
    async fn update_character(
        &self,
        id: i32,
        user_id: i32,
        patch: CharacterPatch,
    ) -> Result<CharacterInfo, CharacterError>;

    /// Deletes an owned character.
    async fn delete_character(&self, id: i32, user_id: i32) -> Result<(), CharacterError>;
}
