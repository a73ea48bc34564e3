use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};

use crate::entities::{users, visits, zones};

/// A visit joined with its zone display data.
#[derive(Debug, Clone, FromQueryResult)]
pub struct VisitWithZone {
    pub id: i32,
    pub visited_at: String,
    pub zone_key: String,
    pub zone_name: String,
    pub boss_name: Option<String>,
    pub level: Option<i32>,
}

/// Who completed a zone in a period, and when.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ZoneVisitorRow {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
    pub visited_at: String,
}

pub struct VisitRepository {
    conn: DatabaseConnection,
}

impl VisitRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a visit. Returns `None` when the (user, zone, period) triple
    /// already exists; the unique index is what closes the concurrent
    /// double-mark race.
    pub async fn try_insert(
        &self,
        user_id: i32,
        zone_id: i32,
        period_id: i32,
    ) -> Result<Option<visits::Model>> {
        let active = visits::ActiveModel {
            user_id: Set(user_id),
            zone_id: Set(zone_id),
            period_id: Set(period_id),
            visited_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Ok(None)
                } else {
                    Err(err).context("Failed to insert visit")
                }
            }
        }
    }

    /// Delete the visit for (user, zone, period). Returns whether a row
    /// actually existed.
    pub async fn delete(&self, user_id: i32, zone_id: i32, period_id: i32) -> Result<bool> {
        let result = visits::Entity::delete_many()
            .filter(visits::Column::UserId.eq(user_id))
            .filter(visits::Column::ZoneId.eq(zone_id))
            .filter(visits::Column::PeriodId.eq(period_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete visit")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_for_user_in_period(
        &self,
        user_id: i32,
        period_id: i32,
    ) -> Result<Vec<VisitWithZone>> {
        visits::Entity::find()
            .select_only()
            .column(visits::Column::Id)
            .column(visits::Column::VisitedAt)
            .column_as(zones::Column::ZoneId, "zone_key")
            .column_as(zones::Column::Name, "zone_name")
            .column_as(zones::Column::BossName, "boss_name")
            .column_as(zones::Column::Level, "level")
            .join(JoinType::InnerJoin, visits::Relation::Zones.def())
            .filter(visits::Column::UserId.eq(user_id))
            .filter(visits::Column::PeriodId.eq(period_id))
            .order_by_desc(visits::Column::VisitedAt)
            .into_model::<VisitWithZone>()
            .all(&self.conn)
            .await
            .context("Failed to query visits with zones")
    }

    pub async fn count_in_period(&self, period_id: i32) -> Result<u64> {
        visits::Entity::find()
            .filter(visits::Column::PeriodId.eq(period_id))
            .count(&self.conn)
            .await
            .context("Failed to count visits in period")
    }

    /// Distinct users with at least one visit in the period.
    pub async fn user_ids_in_period(&self, period_id: i32) -> Result<Vec<i32>> {
        visits::Entity::find()
            .select_only()
            .column(visits::Column::UserId)
            .filter(visits::Column::PeriodId.eq(period_id))
            .group_by(visits::Column::UserId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query active users in period")
    }

    /// Visit counts per zone (internal id) within a period.
    pub async fn zone_counts_in_period(&self, period_id: i32) -> Result<Vec<(i32, i64)>> {
        visits::Entity::find()
            .select_only()
            .column(visits::Column::ZoneId)
            .column_as(visits::Column::Id.count(), "count")
            .filter(visits::Column::PeriodId.eq(period_id))
            .group_by(visits::Column::ZoneId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count visits per zone")
    }

    pub async fn visitors_in_period(
        &self,
        zone_id: i32,
        period_id: i32,
    ) -> Result<Vec<ZoneVisitorRow>> {
        visits::Entity::find()
            .select_only()
            .column_as(users::Column::TelegramId, "telegram_id")
            .column_as(users::Column::Username, "username")
            .column_as(users::Column::CharacterName, "character_name")
            .column(visits::Column::VisitedAt)
            .join(JoinType::InnerJoin, visits::Relation::Users.def())
            .filter(visits::Column::ZoneId.eq(zone_id))
            .filter(visits::Column::PeriodId.eq(period_id))
            .order_by_asc(visits::Column::VisitedAt)
            .into_model::<ZoneVisitorRow>()
            .all(&self.conn)
            .await
            .context("Failed to query zone visitors")
    }
}
