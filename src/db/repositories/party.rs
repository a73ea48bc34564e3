use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{parties, party_members, users};

pub struct PartyRepository {
    conn: DatabaseConnection,
}

impl PartyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert the party plus one membership row per invited user.
    pub async fn create(
        &self,
        creator_id: i32,
        zone_id: i32,
        ready_time: &str,
        member_ids: &[i32],
    ) -> Result<parties::Model> {
        let active = parties::ActiveModel {
            creator_id: Set(creator_id),
            zone_id: Set(zone_id),
            ready_time: Set(ready_time.to_string()),
            status: Set("pending".to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let party = active
            .insert(&self.conn)
            .await
            .context("Failed to create party")?;

        if !member_ids.is_empty() {
            let members: Vec<party_members::ActiveModel> = member_ids
                .iter()
                .map(|&user_id| party_members::ActiveModel {
                    party_id: Set(party.id),
                    user_id: Set(user_id),
                    ..Default::default()
                })
                .collect();

            party_members::Entity::insert_many(members)
                .exec(&self.conn)
                .await
                .context("Failed to insert party members")?;
        }

        Ok(party)
    }

    /// Parties the user created or is invited to, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<parties::Model>> {
        let member_party_ids: Vec<i32> = {
            use sea_orm::QuerySelect;

            party_members::Entity::find()
                .select_only()
                .column(party_members::Column::PartyId)
                .filter(party_members::Column::UserId.eq(user_id))
                .into_tuple()
                .all(&self.conn)
                .await
                .context("Failed to query party memberships")?
        };

        parties::Entity::find()
            .filter(
                Condition::any()
                    .add(parties::Column::CreatorId.eq(user_id))
                    .add(parties::Column::Id.is_in(member_party_ids)),
            )
            .order_by_desc(parties::Column::CreatedAt)
            .order_by_desc(parties::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query parties")
    }

    /// Membership rows for a set of parties, joined with the invited users.
    pub async fn members_with_users(
        &self,
        party_ids: &[i32],
    ) -> Result<Vec<(party_members::Model, Option<users::Model>)>> {
        if party_ids.is_empty() {
            return Ok(Vec::new());
        }

        party_members::Entity::find()
            .filter(party_members::Column::PartyId.is_in(party_ids.to_vec()))
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to query party members")
    }
}
