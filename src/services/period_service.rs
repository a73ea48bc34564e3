//! Domain service for completion period lifecycle.
//!
//! Periods scope visit accounting. At most one period is active at a time;
//! the active one is created on demand and replaced by rotation.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to period operations.
#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PeriodError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PeriodError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Period DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodInfo {
    pub period_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
}

/// What a rotation run did.
#[derive(Debug, Clone, Serialize)]
pub struct RotationOutcome {
    pub closed_periods: u64,
    pub new_period: PeriodInfo,
}

/// Domain service trait for period lifecycle.
#[async_trait::async_trait]
pub trait PeriodService: Send + Sync {
    /// Returns the active period, creating one if none exists yet.
    async fn current_period(&self) -> Result<PeriodInfo, PeriodError>;

    /// Closes the active period and opens a fresh one.
    ///
    /// Visit rows in closed periods are kept untouched; only the active
    /// scope moves.
    async fn rotate(&self) -> Result<RotationOutcome, PeriodError>;

    /// Rotation history, newest first.
    async fn list_periods(&self) -> Result<Vec<PeriodInfo>, PeriodError>;
}
