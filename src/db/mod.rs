use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{characters, parties, party_members, periods, users, visits, zone_stats, zones};

pub mod migrator;
pub mod repositories;

pub use repositories::character::CharacterUpdate;
pub use repositories::user::{UserMetadata, generate_reset_code};
pub use repositories::visit::{VisitWithZone, ZoneVisitorRow};
pub use repositories::zone_stat::{TopPlayerRow, UserZoneStatRow, ZoneTopVisitorRow};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn zone_repo(&self) -> repositories::zone::ZoneRepository {
        repositories::zone::ZoneRepository::new(self.conn.clone())
    }

    fn period_repo(&self) -> repositories::period::PeriodRepository {
        repositories::period::PeriodRepository::new(self.conn.clone())
    }

    fn visit_repo(&self) -> repositories::visit::VisitRepository {
        repositories::visit::VisitRepository::new(self.conn.clone())
    }

    fn zone_stat_repo(&self) -> repositories::zone_stat::ZoneStatRepository {
        repositories::zone_stat::ZoneStatRepository::new(self.conn.clone())
    }

    fn character_repo(&self) -> repositories::character::CharacterRepository {
        repositories::character::CharacterRepository::new(self.conn.clone())
    }

    fn party_repo(&self) -> repositories::party::PartyRepository {
        repositories::party::PartyRepository::new(self.conn.clone())
    }

    // ===== Users =====

    pub async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<users::Model>> {
        self.user_repo().get_by_telegram_id(telegram_id).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn try_create_user(
        &self,
        telegram_id: i64,
        metadata: &UserMetadata,
    ) -> Result<Option<users::Model>> {
        self.user_repo().try_create(telegram_id, metadata).await
    }

    pub async fn overwrite_user_metadata(
        &self,
        user: users::Model,
        metadata: &UserMetadata,
    ) -> Result<users::Model> {
        self.user_repo().overwrite_metadata(user, metadata).await
    }

    pub async fn merge_user_metadata(
        &self,
        user: users::Model,
        metadata: &UserMetadata,
    ) -> Result<users::Model> {
        self.user_repo().merge_metadata(user, metadata).await
    }

    pub async fn set_character_name(
        &self,
        user: users::Model,
        character_name: &str,
    ) -> Result<users::Model> {
        self.user_repo()
            .set_character_name(user, character_name)
            .await
    }

    pub async fn set_character_level(&self, user: users::Model, level: i32) -> Result<users::Model> {
        self.user_repo().set_character_level(user, level).await
    }

    pub async fn list_users_with_characters(
        &self,
    ) -> Result<Vec<(users::Model, Vec<characters::Model>)>> {
        self.user_repo().list_with_characters().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn verify_password(&self, telegram_id: i64, password: &str) -> Result<bool> {
        self.user_repo().verify_password(telegram_id, password).await
    }

    pub async fn update_password(
        &self,
        user: users::Model,
        new_password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user, new_password, config)
            .await
    }

    pub async fn set_reset_code(&self, user: users::Model, code: &str, expiry: &str) -> Result<()> {
        self.user_repo().set_reset_code(user, code, expiry).await
    }

    // ===== Zones =====

    pub async fn list_zones(&self) -> Result<Vec<zones::Model>> {
        self.zone_repo().list().await
    }

    pub async fn get_zone_by_key(&self, zone_key: &str) -> Result<Option<zones::Model>> {
        self.zone_repo().get_by_key(zone_key).await
    }

    pub async fn count_zones(&self) -> Result<u64> {
        self.zone_repo().count().await
    }

    // ===== Periods =====

    pub async fn get_active_period(&self) -> Result<Option<periods::Model>> {
        self.period_repo().get_active().await
    }

    pub async fn try_create_period(&self, period_id: &str) -> Result<Option<periods::Model>> {
        self.period_repo().try_create(period_id).await
    }

    pub async fn deactivate_active_periods(&self, end_date: &str) -> Result<u64> {
        self.period_repo().deactivate_active(end_date).await
    }

    pub async fn list_periods(&self) -> Result<Vec<periods::Model>> {
        self.period_repo().list().await
    }

    pub async fn count_active_periods(&self) -> Result<u64> {
        self.period_repo().count_active().await
    }

    // ===== Visits =====

    pub async fn try_insert_visit(
        &self,
        user_id: i32,
        zone_id: i32,
        period_id: i32,
    ) -> Result<Option<visits::Model>> {
        self.visit_repo()
            .try_insert(user_id, zone_id, period_id)
            .await
    }

    pub async fn delete_visit(&self, user_id: i32, zone_id: i32, period_id: i32) -> Result<bool> {
        self.visit_repo().delete(user_id, zone_id, period_id).await
    }

    pub async fn list_visits_for_user(
        &self,
        user_id: i32,
        period_id: i32,
    ) -> Result<Vec<VisitWithZone>> {
        self.visit_repo()
            .list_for_user_in_period(user_id, period_id)
            .await
    }

    pub async fn count_visits_in_period(&self, period_id: i32) -> Result<u64> {
        self.visit_repo().count_in_period(period_id).await
    }

    pub async fn visit_user_ids_in_period(&self, period_id: i32) -> Result<Vec<i32>> {
        self.visit_repo().user_ids_in_period(period_id).await
    }

    pub async fn visit_zone_counts_in_period(&self, period_id: i32) -> Result<Vec<(i32, i64)>> {
        self.visit_repo().zone_counts_in_period(period_id).await
    }

    pub async fn zone_visitors_in_period(
        &self,
        zone_id: i32,
        period_id: i32,
    ) -> Result<Vec<ZoneVisitorRow>> {
        self.visit_repo()
            .visitors_in_period(zone_id, period_id)
            .await
    }

    // ===== Zone stats =====

    pub async fn increment_zone_stat(&self, user_id: i32, zone_id: i32) -> Result<()> {
        self.zone_stat_repo()
            .upsert_increment(user_id, zone_id)
            .await
    }

    pub async fn get_zone_stat(
        &self,
        user_id: i32,
        zone_id: i32,
    ) -> Result<Option<zone_stats::Model>> {
        self.zone_stat_repo().get(user_id, zone_id).await
    }

    pub async fn zone_stats_for_user(&self, user_id: i32) -> Result<Vec<UserZoneStatRow>> {
        self.zone_stat_repo().all_for_user(user_id).await
    }

    pub async fn zone_stat_total_for_zone(&self, zone_id: i32) -> Result<i64> {
        self.zone_stat_repo().total_for_zone(zone_id).await
    }

    pub async fn zone_stat_totals_by_zone(&self) -> Result<Vec<(i32, i64)>> {
        self.zone_stat_repo().totals_by_zone().await
    }

    pub async fn top_zone_visitors(
        &self,
        zone_id: i32,
        limit: u64,
    ) -> Result<Vec<ZoneTopVisitorRow>> {
        self.zone_stat_repo()
            .top_visitors_for_zone(zone_id, limit)
            .await
    }

    pub async fn top_players(&self, limit: usize) -> Result<Vec<TopPlayerRow>> {
        self.zone_stat_repo().top_players(limit).await
    }

    // ===== Characters =====

    pub async fn list_characters(&self, user_id: i32) -> Result<Vec<characters::Model>> {
        self.character_repo().list_for_user(user_id).await
    }

    pub async fn get_character(&self, id: i32) -> Result<Option<characters::Model>> {
        self.character_repo().get_by_id(id).await
    }

    pub async fn create_character(
        &self,
        user_id: i32,
        nickname: &str,
        profession: &str,
        level: i32,
    ) -> Result<characters::Model> {
        self.character_repo()
            .create(user_id, nickname, profession, level)
            .await
    }

    pub async fn update_character(
        &self,
        id: i32,
        user_id: i32,
        update: &CharacterUpdate,
    ) -> Result<Option<characters::Model>> {
        self.character_repo().update(id, user_id, update).await
    }

    pub async fn delete_character(&self, id: i32, user_id: i32) -> Result<bool> {
        self.character_repo().delete(id, user_id).await
    }

    // ===== Parties =====

    pub async fn create_party(
        &self,
        creator_id: i32,
        zone_id: i32,
        ready_time: &str,
        member_ids: &[i32],
    ) -> Result<parties::Model> {
        self.party_repo()
            .create(creator_id, zone_id, ready_time, member_ids)
            .await
    }

    pub async fn list_parties_for_user(&self, user_id: i32) -> Result<Vec<parties::Model>> {
        self.party_repo().list_for_user(user_id).await
    }

    pub async fn party_members_with_users(
        &self,
        party_ids: &[i32],
    ) -> Result<Vec<(party_members::Model, Option<users::Model>)>> {
        self.party_repo().members_with_users(party_ids).await
    }
}
