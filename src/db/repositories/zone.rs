use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::entities::zones;

pub struct ZoneRepository {
    conn: DatabaseConnection,
}

impl ZoneRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Full catalog ordered for display, easiest content first.
    pub async fn list(&self) -> Result<Vec<zones::Model>> {
        zones::Entity::find()
            .order_by_asc(zones::Column::Level)
            .order_by_asc(zones::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to query zones")
    }

    /// Look up a zone by its stable external key.
    pub async fn get_by_key(&self, zone_key: &str) -> Result<Option<zones::Model>> {
        zones::Entity::find()
            .filter(zones::Column::ZoneId.eq(zone_key))
            .one(&self.conn)
            .await
            .context("Failed to query zone by key")
    }

    pub async fn count(&self) -> Result<u64> {
        zones::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count zones")
    }
}
