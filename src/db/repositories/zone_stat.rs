use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

use crate::entities::{users, zone_stats, zones};

/// A user's all-time counter for one zone, with zone display data.
#[derive(Debug, Clone, FromQueryResult)]
pub struct UserZoneStatRow {
    pub zone_key: String,
    pub zone_name: String,
    pub boss_name: Option<String>,
    pub total_visits: i32,
    pub last_visited: String,
}

/// All-time top visitor of one zone.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ZoneTopVisitorRow {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
    pub total_visits: i32,
    pub last_visited: String,
}

/// All-time leaderboard entry, counters summed across zones.
#[derive(Debug, Clone, FromQueryResult)]
pub struct TopPlayerRow {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
    pub character_level: Option<i32>,
    pub total_visits: i64,
}

pub struct ZoneStatRepository {
    conn: DatabaseConnection,
}

impl ZoneStatRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create the counter at 1 or atomically bump it, refreshing the
    /// last-visited stamp. A single upsert so concurrent marks never lose
    /// an increment to a read-modify-write race.
    pub async fn upsert_increment(&self, user_id: i32, zone_id: i32) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = zone_stats::ActiveModel {
            user_id: sea_orm::Set(user_id),
            zone_id: sea_orm::Set(zone_id),
            total_visits: sea_orm::Set(1),
            last_visited: sea_orm::Set(now.clone()),
            ..Default::default()
        };

        zone_stats::Entity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    zone_stats::Column::UserId,
                    zone_stats::Column::ZoneId,
                ])
                .value(
                    zone_stats::Column::TotalVisits,
                    Expr::col(zone_stats::Column::TotalVisits).add(1),
                )
                .value(zone_stats::Column::LastVisited, Expr::value(now))
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert zone stat")?;

        Ok(())
    }

    pub async fn get(&self, user_id: i32, zone_id: i32) -> Result<Option<zone_stats::Model>> {
        zone_stats::Entity::find()
            .filter(zone_stats::Column::UserId.eq(user_id))
            .filter(zone_stats::Column::ZoneId.eq(zone_id))
            .one(&self.conn)
            .await
            .context("Failed to query zone stat")
    }

    /// All counters for one user, highest first.
    pub async fn all_for_user(&self, user_id: i32) -> Result<Vec<UserZoneStatRow>> {
        zone_stats::Entity::find()
            .select_only()
            .column_as(zones::Column::ZoneId, "zone_key")
            .column_as(zones::Column::Name, "zone_name")
            .column_as(zones::Column::BossName, "boss_name")
            .column(zone_stats::Column::TotalVisits)
            .column(zone_stats::Column::LastVisited)
            .join(JoinType::InnerJoin, zone_stats::Relation::Zones.def())
            .filter(zone_stats::Column::UserId.eq(user_id))
            .order_by_desc(zone_stats::Column::TotalVisits)
            .into_model::<UserZoneStatRow>()
            .all(&self.conn)
            .await
            .context("Failed to query user zone stats")
    }

    /// Summed counter for one zone across all users. Zero when nobody has
    /// ever completed it.
    pub async fn total_for_zone(&self, zone_id: i32) -> Result<i64> {
        let row: Option<Option<i64>> = zone_stats::Entity::find()
            .select_only()
            .column_as(zone_stats::Column::TotalVisits.sum(), "total")
            .filter(zone_stats::Column::ZoneId.eq(zone_id))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to sum zone stats for zone")?;

        Ok(row.flatten().unwrap_or(0))
    }

    /// Summed counters per zone (internal id), all users.
    pub async fn totals_by_zone(&self) -> Result<Vec<(i32, i64)>> {
        zone_stats::Entity::find()
            .select_only()
            .column(zone_stats::Column::ZoneId)
            .column_as(zone_stats::Column::TotalVisits.sum(), "total")
            .group_by(zone_stats::Column::ZoneId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to sum zone stats per zone")
    }

    pub async fn top_visitors_for_zone(
        &self,
        zone_id: i32,
        limit: u64,
    ) -> Result<Vec<ZoneTopVisitorRow>> {
        zone_stats::Entity::find()
            .select_only()
            .column_as(users::Column::TelegramId, "telegram_id")
            .column_as(users::Column::Username, "username")
            .column_as(users::Column::CharacterName, "character_name")
            .column(zone_stats::Column::TotalVisits)
            .column(zone_stats::Column::LastVisited)
            .join(JoinType::InnerJoin, zone_stats::Relation::Users.def())
            .filter(zone_stats::Column::ZoneId.eq(zone_id))
            .order_by_desc(zone_stats::Column::TotalVisits)
            .limit(limit)
            .into_model::<ZoneTopVisitorRow>()
            .all(&self.conn)
            .await
            .context("Failed to query top zone visitors")
    }

    /// Counters summed per user across all zones. Sorted in Rust so rows
    /// with equal totals keep their storage order.
    pub async fn top_players(&self, limit: usize) -> Result<Vec<TopPlayerRow>> {
        let mut rows: Vec<TopPlayerRow> = zone_stats::Entity::find()
            .select_only()
            .column_as(users::Column::TelegramId, "telegram_id")
            .column_as(users::Column::Username, "username")
            .column_as(users::Column::CharacterName, "character_name")
            .column_as(users::Column::CharacterLevel, "character_level")
            .column_as(zone_stats::Column::TotalVisits.sum(), "total_visits")
            .join(JoinType::InnerJoin, zone_stats::Relation::Users.def())
            .group_by(zone_stats::Column::UserId)
            .into_model::<TopPlayerRow>()
            .all(&self.conn)
            .await
            .context("Failed to query top players")?;

        rows.sort_by(|a, b| b.total_visits.cmp(&a.total_visits));
        rows.truncate(limit);

        Ok(rows)
    }
}
