//! `SeaORM` implementation of the `PeriodService` trait.

use crate::db::Store;
use crate::entities::periods;
use crate::services::period_service::{PeriodError, PeriodInfo, PeriodService, RotationOutcome};
use async_trait::async_trait;

/// Returns the active period row, creating one when none exists.
///
/// Creation can lose to a concurrent caller; the single-active index
/// rejects the duplicate insert and the winner's row is re-read instead.
pub async fn ensure_current_period(store: &Store) -> anyhow::Result<periods::Model> {
    if let Some(active) = store.get_active_period().await? {
        return Ok(active);
    }

    let period_id = new_period_id();
    if let Some(created) = store.try_create_period(&period_id).await? {
        tracing::info!(period_id = %created.period_id, "Opened new completion period");
        return Ok(created);
    }

    store
        .get_active_period()
        .await?
        .ok_or_else(|| anyhow::anyhow!("No active period found after concurrent creation"))
}

/// Period identifiers carry their creation instant, so they are never reused.
fn new_period_id() -> String {
    format!("period_{}", chrono::Utc::now().timestamp_millis())
}

fn to_info(period: periods::Model) -> PeriodInfo {
    PeriodInfo {
        period_id: period.period_id,
        start_date: period.start_date,
        end_date: period.end_date,
        is_active: period.is_active,
    }
}

pub struct SeaOrmPeriodService {
    store: Store,
}

impl SeaOrmPeriodService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PeriodService for SeaOrmPeriodService {
    async fn current_period(&self) -> Result<PeriodInfo, PeriodError> {
        let period = ensure_current_period(&self.store).await?;
        Ok(to_info(period))
    }

    async fn rotate(&self) -> Result<RotationOutcome, PeriodError> {
        let end_date = chrono::Utc::now().to_rfc3339();
        let closed = self.store.deactivate_active_periods(&end_date).await?;

        let period = match self.store.try_create_period(&new_period_id()).await? {
            Some(created) => created,
            // A concurrent request opened the next period first; adopt it.
            None => self.store.get_active_period().await?.ok_or_else(|| {
                PeriodError::Internal("No active period found after rotation".to_string())
            })?,
        };

        tracing::info!(
            closed_periods = closed,
            period_id = %period.period_id,
            "Rotated completion period"
        );

        Ok(RotationOutcome {
            closed_periods: closed,
            new_period: to_info(period),
        })
    }

    async fn list_periods(&self) -> Result<Vec<PeriodInfo>, PeriodError> {
        let periods = self.store.list_periods().await?;
        Ok(periods.into_iter().map(to_info).collect())
    }
}
