use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

use crate::entities::periods;

pub struct PeriodRepository {
    conn: DatabaseConnection,
}

impl PeriodRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_active(&self) -> Result<Option<periods::Model>> {
        periods::Entity::find()
            .filter(periods::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query active period")
    }

    /// Insert a fresh active period. Returns `None` when the identifier
    /// already exists, which means a concurrent caller won the creation.
    pub async fn try_create(&self, period_id: &str) -> Result<Option<periods::Model>> {
        let active = periods::ActiveModel {
            period_id: Set(period_id.to_string()),
            start_date: Set(chrono::Utc::now().to_rfc3339()),
            end_date: Set(None),
            is_active: Set(true),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Ok(None)
                } else {
                    Err(err).context("Failed to create period")
                }
            }
        }
    }

    /// Deactivate every active period, stamping its end date. Returns the
    /// number of periods closed (normally 1, but degenerate states with
    /// several active rows are swept in the same statement).
    pub async fn deactivate_active(&self, end_date: &str) -> Result<u64> {
        let result = periods::Entity::update_many()
            .col_expr(periods::Column::IsActive, Expr::value(false))
            .col_expr(periods::Column::EndDate, Expr::value(end_date))
            .filter(periods::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to deactivate periods")?;

        Ok(result.rows_affected)
    }

    /// Rotation history, newest first.
    pub async fn list(&self) -> Result<Vec<periods::Model>> {
        periods::Entity::find()
            .order_by_desc(periods::Column::StartDate)
            .all(&self.conn)
            .await
            .context("Failed to query periods")
    }

    pub async fn count_active(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        periods::Entity::find()
            .filter(periods::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count active periods")
    }
}
