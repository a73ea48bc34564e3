//! Domain service for zone completion accounting.
//!
//! A visit is one completion of one zone by one user inside the current
//! period. Marking also bumps the user's all-time counter for the zone;
//! removing frees the period slot but leaves the counter untouched.

use serde::Serialize;
use thiserror::Error;

use crate::db::VisitWithZone;

/// Errors specific to visit operations.
#[derive(Debug, Error)]
pub enum VisitError {
    #[error("Instance zone not found")]
    ZoneNotFound,

    #[error("Already visited this zone in current period")]
    AlreadyVisited,

    #[error("Visit not found")]
    VisitNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for VisitError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for VisitError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A completion with its zone display data.
#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub id: i32,
    pub zone_id: String,
    pub zone_name: String,
    pub boss_name: Option<String>,
    pub level: Option<i32>,
    pub visited_at: String,
}

impl From<VisitWithZone> for VisitRecord {
    fn from(row: VisitWithZone) -> Self {
        Self {
            id: row.id,
            zone_id: row.zone_key,
            zone_name: row.zone_name,
            boss_name: row.boss_name,
            level: row.level,
            visited_at: row.visited_at,
        }
    }
}

/// Domain service trait for visits.
#[async_trait::async_trait]
pub trait VisitService: Send + Sync {
    /// Records a completion of `zone_key` for the user in the current
    /// period.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::ZoneNotFound`] for an unknown zone and
    /// [`VisitError::AlreadyVisited`] when the user already holds a visit
    /// for this zone in the current period.
    async fn mark_visit(&self, user_id: i32, zone_key: &str) -> Result<VisitRecord, VisitError>;

    /// Removes the user's current-period completion of `zone_key`.
    ///
    /// The all-time counter is deliberately not decremented.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::VisitNotFound`] when no such visit exists in
    /// the current period.
    async fn remove_visit(&self, user_id: i32, zone_key: &str) -> Result<(), VisitError>;

    /// Current-period visits of one user, newest first.
    async fn visits_for_user(&self, user_id: i32) -> Result<Vec<VisitRecord>, VisitError>;

    /// Current-period visits looked up by Telegram id.
    async fn visits_for_telegram_user(
        &self,
        telegram_id: i64,
    ) -> Result<Vec<VisitRecord>, VisitError>;
}
