//! `SeaORM` implementation of the `VisitService` trait.

use crate::db::Store;
use crate::services::period_service_impl::ensure_current_period;
use crate::services::visit_service::{VisitError, VisitRecord, VisitService};
use async_trait::async_trait;

pub struct SeaOrmVisitService {
    store: Store,
}

impl SeaOrmVisitService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn period_visits(&self, user_id: i32) -> Result<Vec<VisitRecord>, VisitError> {
        let period = ensure_current_period(&self.store).await?;
        let visits = self.store.list_visits_for_user(user_id, period.id).await?;
        Ok(visits.into_iter().map(VisitRecord::from).collect())
    }
}

#[async_trait]
impl VisitService for SeaOrmVisitService {
    async fn mark_visit(&self, user_id: i32, zone_key: &str) -> Result<VisitRecord, VisitError> {
        let zone = self
            .store
            .get_zone_by_key(zone_key)
            .await?
            .ok_or(VisitError::ZoneNotFound)?;
        let period = ensure_current_period(&self.store).await?;

        // The unique (user, zone, period) index arbitrates concurrent
        // marks; the loser surfaces here as AlreadyVisited.
        let Some(visit) = self
            .store
            .try_insert_visit(user_id, zone.id, period.id)
            .await?
        else {
            return Err(VisitError::AlreadyVisited);
        };

        // Counter bump happens only after the visit row is in, so a
        // rejected mark never inflates the all-time numbers.
        self.store.increment_zone_stat(user_id, zone.id).await?;

        tracing::debug!(
            user_id,
            zone = %zone.zone_id,
            period = %period.period_id,
            "Marked zone visit"
        );

        Ok(VisitRecord {
            id: visit.id,
            zone_id: zone.zone_id,
            zone_name: zone.name,
            boss_name: zone.boss_name,
            level: zone.level,
            visited_at: visit.visited_at,
        })
    }

    async fn remove_visit(&self, user_id: i32, zone_key: &str) -> Result<(), VisitError> {
        let zone = self
            .store
            .get_zone_by_key(zone_key)
            .await?
            .ok_or(VisitError::ZoneNotFound)?;
        let period = ensure_current_period(&self.store).await?;

        let removed = self.store.delete_visit(user_id, zone.id, period.id).await?;
        if !removed {
            return Err(VisitError::VisitNotFound);
        }

        tracing::debug!(
            user_id,
            zone = %zone.zone_id,
            period = %period.period_id,
            "Removed zone visit"
        );

        Ok(())
    }

    async fn visits_for_user(&self, user_id: i32) -> Result<Vec<VisitRecord>, VisitError> {
        self.period_visits(user_id).await
    }

    async fn visits_for_telegram_user(
        &self,
        telegram_id: i64,
    ) -> Result<Vec<VisitRecord>, VisitError> {
        let user = self
            .store
            .get_user_by_telegram_id(telegram_id)
            .await?
            .ok_or(VisitError::UserNotFound)?;
        self.period_visits(user.id).await
    }
}
