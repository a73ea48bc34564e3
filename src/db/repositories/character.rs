use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::characters;

/// Optional field updates for an existing character.
#[derive(Debug, Clone, Default)]
pub struct CharacterUpdate {
    pub nickname: Option<String>,
    pub profession: Option<String>,
    pub level: Option<i32>,
}

pub struct CharacterRepository {
    conn: DatabaseConnection,
}

impl CharacterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<characters::Model>> {
        characters::Entity::find()
            .filter(characters::Column::UserId.eq(user_id))
            .order_by_desc(characters::Column::CreatedAt)
            .order_by_desc(characters::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query characters")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<characters::Model>> {
        characters::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query character by ID")
    }

    pub async fn create(
        &self,
        user_id: i32,
        nickname: &str,
        profession: &str,
        level: i32,
    ) -> Result<characters::Model> {
        let active = characters::ActiveModel {
            user_id: Set(user_id),
            nickname: Set(nickname.to_string()),
            profession: Set(profession.to_string()),
            level: Set(level),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to create character")
    }

    /// Update a character owned by the given user. Returns `None` when no
    /// such character exists for that owner.
    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        update: &CharacterUpdate,
    ) -> Result<Option<characters::Model>> {
        let existing = characters::Entity::find_by_id(id)
            .filter(characters::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query character for update")?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: characters::ActiveModel = existing.into();
        if let Some(nickname) = &update.nickname {
            active.nickname = Set(nickname.clone());
        }
        if let Some(profession) = &update.profession {
            active.profession = Set(profession.clone());
        }
        if let Some(level) = update.level {
            active.level = Set(level);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update character")?;

        Ok(Some(updated))
    }

    /// Delete a character owned by the given user. Returns whether a row
    /// actually existed.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = characters::Entity::delete_many()
            .filter(characters::Column::Id.eq(id))
            .filter(characters::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete character")?;

        Ok(result.rows_affected > 0)
    }
}
