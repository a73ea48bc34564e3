//! `SeaORM` implementation of the `StatisticsService` trait.

use std::collections::HashMap;

use crate::db::Store;
use crate::entities::{users, zones};
use crate::services::period_service_impl::ensure_current_period;
use crate::services::statistics_service::{
    GlobalAllTime, GlobalPeriodStats, GlobalStatistics, PeriodProgress, PlayerRef,
    PlayerStatistics, StatisticsError, StatisticsService, TopPlayer, UserAllTime, UserStatistics,
    UserZoneStat, ZoneAllTime, ZoneHeader, ZonePeriodStats, ZonePopularity, ZoneStatistics,
    ZoneTopVisitor, ZoneVisitor,
};
use crate::services::visit_service::VisitRecord;
use async_trait::async_trait;

/// How many entries the "most visited" style rankings carry.
const MOST_VISITED_LIMIT: usize = 5;
const ZONE_POPULARITY_LIMIT: usize = 10;
const ZONE_TOP_VISITORS_LIMIT: u64 = 10;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ranks the full catalog by count, zones nobody ran included with zero.
/// The sort is stable, so equal counts keep catalog order.
fn rank_zones(
    zones: &[zones::Model],
    counts: &HashMap<i32, i64>,
    limit: usize,
) -> Vec<ZonePopularity> {
    let mut ranked: Vec<ZonePopularity> = zones
        .iter()
        .map(|zone| ZonePopularity {
            zone_id: zone.zone_id.clone(),
            name: zone.name.clone(),
            visits: counts.get(&zone.id).copied().unwrap_or(0),
        })
        .collect();

    ranked.sort_by(|a, b| b.visits.cmp(&a.visits));
    ranked.truncate(limit);
    ranked
}

pub struct SeaOrmStatisticsService {
    store: Store,
}

impl SeaOrmStatisticsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn assemble_user_stats(
        &self,
        user_id: i32,
    ) -> Result<(PeriodProgress, UserAllTime), StatisticsError> {
        let period = ensure_current_period(&self.store).await?;
        let visits = self.store.list_visits_for_user(user_id, period.id).await?;
        let total = self.store.count_zones().await?;

        let visited = visits.len() as u64;
        let completion_rate = if total == 0 {
            0.0
        } else {
            round2(visited as f64 / total as f64 * 100.0)
        };

        let current_period = PeriodProgress {
            visited,
            available: total.saturating_sub(visited),
            total,
            completion_rate,
            visits: visits.into_iter().map(VisitRecord::from).collect(),
        };

        let zone_stats: Vec<UserZoneStat> = self
            .store
            .zone_stats_for_user(user_id)
            .await?
            .into_iter()
            .map(|row| UserZoneStat {
                zone_id: row.zone_key,
                zone_name: row.zone_name,
                boss_name: row.boss_name,
                total_visits: row.total_visits,
                last_visited: row.last_visited,
            })
            .collect();

        let total_visits = zone_stats
            .iter()
            .map(|stat| i64::from(stat.total_visits))
            .sum();
        let most_visited = zone_stats.iter().take(MOST_VISITED_LIMIT).cloned().collect();

        let all_time = UserAllTime {
            total_visits,
            zone_stats,
            most_visited,
        };

        Ok((current_period, all_time))
    }
}

#[async_trait]
impl StatisticsService for SeaOrmStatisticsService {
    async fn user_statistics(&self, user_id: i32) -> Result<UserStatistics, StatisticsError> {
        let (current_period, all_time) = self.assemble_user_stats(user_id).await?;
        Ok(UserStatistics {
            current_period,
            all_time,
        })
    }

    async fn player_statistics(
        &self,
        telegram_id: i64,
    ) -> Result<PlayerStatistics, StatisticsError> {
        let user = self
            .store
            .get_user_by_telegram_id(telegram_id)
            .await?
            .ok_or(StatisticsError::UserNotFound)?;

        let (current_period, all_time) = self.assemble_user_stats(user.id).await?;
        Ok(PlayerStatistics {
            user: player_ref(&user),
            current_period,
            all_time,
        })
    }

    async fn global_statistics(&self) -> Result<GlobalStatistics, StatisticsError> {
        let period = ensure_current_period(&self.store).await?;
        let zones = self.store.list_zones().await?;

        let total_visits = self.store.count_visits_in_period(period.id).await?;
        let active_users = self.store.visit_user_ids_in_period(period.id).await?.len() as u64;
        let total_users = self.store.count_users().await?;
        let average_visits_per_user = if active_users == 0 {
            0.0
        } else {
            round2(total_visits as f64 / active_users as f64)
        };

        let period_counts: HashMap<i32, i64> = self
            .store
            .visit_zone_counts_in_period(period.id)
            .await?
            .into_iter()
            .collect();
        let all_time_counts: HashMap<i32, i64> = self
            .store
            .zone_stat_totals_by_zone()
            .await?
            .into_iter()
            .collect();
        let all_time_total: i64 = all_time_counts.values().sum();

        Ok(GlobalStatistics {
            current_period: GlobalPeriodStats {
                total_visits,
                active_users,
                total_users,
                average_visits_per_user,
                zone_popularity: rank_zones(&zones, &period_counts, ZONE_POPULARITY_LIMIT),
            },
            all_time: GlobalAllTime {
                total_visits: all_time_total,
                most_popular_zones: rank_zones(&zones, &all_time_counts, MOST_VISITED_LIMIT),
            },
        })
    }

    async fn zone_statistics(&self, zone_key: &str) -> Result<ZoneStatistics, StatisticsError> {
        let zone = self
            .store
            .get_zone_by_key(zone_key)
            .await?
            .ok_or(StatisticsError::ZoneNotFound)?;
        let period = ensure_current_period(&self.store).await?;

        let visitors: Vec<ZoneVisitor> = self
            .store
            .zone_visitors_in_period(zone.id, period.id)
            .await?
            .into_iter()
            .map(|row| ZoneVisitor {
                telegram_id: row.telegram_id,
                username: row.username,
                character_name: row.character_name,
                visited_at: row.visited_at,
            })
            .collect();

        let total_visits = self.store.zone_stat_total_for_zone(zone.id).await?;
        let top_visitors = self
            .store
            .top_zone_visitors(zone.id, ZONE_TOP_VISITORS_LIMIT)
            .await?
            .into_iter()
            .map(|row| ZoneTopVisitor {
                telegram_id: row.telegram_id,
                username: row.username,
                character_name: row.character_name,
                total_visits: row.total_visits,
                last_visited: row.last_visited,
            })
            .collect();

        Ok(ZoneStatistics {
            zone: ZoneHeader {
                zone_id: zone.zone_id,
                name: zone.name,
                boss_name: zone.boss_name,
                level: zone.level,
            },
            current_period: ZonePeriodStats {
                visits: visitors.len() as u64,
                visitors,
            },
            all_time: ZoneAllTime {
                total_visits,
                top_visitors,
            },
        })
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<TopPlayer>, StatisticsError> {
        let rows = self.store.top_players(limit).await?;
        Ok(rows
            .into_iter()
            .map(|row| TopPlayer {
                telegram_id: row.telegram_id,
                username: row.username,
                character_name: row.character_name,
                character_level: row.character_level,
                total_visits: row.total_visits,
            })
            .collect())
    }
}

fn player_ref(user: &users::Model) -> PlayerRef {
    PlayerRef {
        telegram_id: user.telegram_id,
        username: user.username.clone(),
        character_name: user.character_name.clone(),
    }
}
