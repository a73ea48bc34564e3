//! Domain service for completion statistics.
//!
//! Three views over the same data: per-user (current period plus all-time
//! counters), global (activity across all users), and per-zone (who runs
//! what). Current-period numbers come from visit rows, all-time numbers
//! from the monotonic counters.

use serde::Serialize;
use thiserror::Error;

use crate::services::visit_service::VisitRecord;

/// Errors specific to statistics queries.
#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("User not found")]
    UserNotFound,

    #[error("Instance zone not found")]
    ZoneNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for StatisticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for StatisticsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// One user's progress through the current period.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodProgress {
    pub visited: u64,
    pub available: u64,
    pub total: u64,
    pub completion_rate: f64,
    pub visits: Vec<VisitRecord>,
}

/// A user's all-time counter for one zone.
#[derive(Debug, Clone, Serialize)]
pub struct UserZoneStat {
    pub zone_id: String,
    pub zone_name: String,
    pub boss_name: Option<String>,
    pub total_visits: i32,
    pub last_visited: String,
}

/// One user's all-time numbers.
#[derive(Debug, Clone, Serialize)]
pub struct UserAllTime {
    pub total_visits: i64,
    pub zone_stats: Vec<UserZoneStat>,
    pub most_visited: Vec<UserZoneStat>,
}

/// Full statistics for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
    pub current_period: PeriodProgress,
    pub all_time: UserAllTime,
}

/// Minimal identity attached to lookups of other players.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRef {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
}

/// Statistics for a player looked up by Telegram id.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatistics {
    pub user: PlayerRef,
    pub current_period: PeriodProgress,
    pub all_time: UserAllTime,
}

/// A zone with its visit count, for popularity rankings. Zones nobody has
/// run appear with zero.
#[derive(Debug, Clone, Serialize)]
pub struct ZonePopularity {
    pub zone_id: String,
    pub name: String,
    pub visits: i64,
}

/// Server-wide numbers for the current period.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalPeriodStats {
    pub total_visits: u64,
    pub active_users: u64,
    pub total_users: u64,
    pub average_visits_per_user: f64,
    pub zone_popularity: Vec<ZonePopularity>,
}

/// Server-wide all-time numbers.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalAllTime {
    pub total_visits: i64,
    pub most_popular_zones: Vec<ZonePopularity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalStatistics {
    pub current_period: GlobalPeriodStats,
    pub all_time: GlobalAllTime,
}

/// Zone display data echoed back with per-zone statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneHeader {
    pub zone_id: String,
    pub name: String,
    pub boss_name: Option<String>,
    pub level: Option<i32>,
}

/// Someone who completed the zone this period.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneVisitor {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
    pub visited_at: String,
}

/// All-time ranking entry for one zone.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneTopVisitor {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
    pub total_visits: i32,
    pub last_visited: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZonePeriodStats {
    pub visits: u64,
    pub visitors: Vec<ZoneVisitor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneAllTime {
    pub total_visits: i64,
    pub top_visitors: Vec<ZoneTopVisitor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneStatistics {
    pub zone: ZoneHeader,
    pub current_period: ZonePeriodStats,
    pub all_time: ZoneAllTime,
}

/// All-time leaderboard entry across every zone.
#[derive(Debug, Clone, Serialize)]
pub struct TopPlayer {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub character_name: Option<String>,
    pub character_level: Option<i32>,
    pub total_visits: i64,
}

/// Domain service trait for statistics.
#[async_trait::async_trait]
pub trait StatisticsService: Send + Sync {
    /// Statistics for an already resolved user.
    async fn user_statistics(&self, user_id: i32) -> Result<UserStatistics, StatisticsError>;

    /// Statistics for a player looked up by Telegram id.
    ///
    /// # Errors
    ///
    /// Returns [`StatisticsError::UserNotFound`] for an unknown player.
    async fn player_statistics(
        &self,
        telegram_id: i64,
    ) -> Result<PlayerStatistics, StatisticsError>;

    /// Server-wide statistics.
    async fn global_statistics(&self) -> Result<GlobalStatistics, StatisticsError>;

    /// Per-zone statistics.
    ///
    /// # Errors
    ///
    /// Returns [`StatisticsError::ZoneNotFound`] for an unknown zone.
    async fn zone_statistics(&self, zone_key: &str) -> Result<ZoneStatistics, StatisticsError>;

    /// All-time leaderboard, best first.
    async fn top_players(&self, limit: usize) -> Result<Vec<TopPlayer>, StatisticsError>;
}
