//! `SeaORM` implementation of the `CharacterService` trait.

use crate::db::{CharacterUpdate, Store};
use crate::services::character_service::{
    CharacterError, CharacterInfo, CharacterPatch, CharacterService,
};
use async_trait::async_trait;

const LEVEL_RANGE: std::ops::RangeInclusive<i32> = 1..=100;

fn validate_level(level: i32) -> Result<(), CharacterError> {
    if LEVEL_RANGE.contains(&level) {
        Ok(())
    } else {
        Err(CharacterError::Validation(
            "Level must be between 1 and 100".to_string(),
        ))
    }
}

pub struct SeaOrmCharacterService {
    store: Store,
}

impl SeaOrmCharacterService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CharacterService for SeaOrmCharacterService {
    async fn list_characters(&self, user_id: i32) -> Result<Vec<CharacterInfo>, CharacterError> {
        let characters = self.store.list_characters(user_id).await?;
        Ok(characters.into_iter().map(CharacterInfo::from).collect())
    }

    async fn create_character(
        &self,
        user_id: i32,
        nickname: &str,
        profession: &str,
        level: i32,
    ) -> Result<CharacterInfo, CharacterError> {
        let nickname = nickname.trim();
        let profession = profession.trim();
        if nickname.is_empty() || profession.is_empty() {
            return Err(CharacterError::Validation(
                "Nickname and profession are required".to_string(),
            ));
        }
        validate_level(level)?;

        let character = self
            .store
            .create_character(user_id, nickname, profession, level)
            .await?;
        Ok(character.into())
    }

    async fn update_character(
        &self,
        id: i32,
        user_id: i32,
        patch: CharacterPatch,
    ) -> Result<CharacterInfo, CharacterError> {
        if let Some(level) = patch.level {
            validate_level(level)?;
        }
        let nickname = patch.nickname.map(|n| n.trim().to_string());
        let profession = patch.profession.map(|p| p.trim().to_string());
        if nickname.as_deref() == Some("") || profession.as_deref() == Some("") {
            return Err(CharacterError::Validation(
                "Nickname and profession cannot be blank".to_string(),
            ));
        }

        let update = CharacterUpdate {
            nickname,
            profession,
            level: patch.level,
        };

        let character = self
            .store
            .update_character(id, user_id, &update)
            .await?
            .ok_or(CharacterError::CharacterNotFound)?;
        Ok(character.into())
    }

    async fn delete_character(&self, id: i32, user_id: i32) -> Result<(), CharacterError> {
        let deleted = self.store.delete_character(id, user_id).await?;
        if !deleted {
            return Err(CharacterError::CharacterNotFound);
        }
        Ok(())
    }
}
