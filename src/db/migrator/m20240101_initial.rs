use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Zones)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Periods)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Visits)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ZoneStats)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Characters)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Parties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(PartyMembers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Uniqueness that backs conflict-to-domain-error translation: a
        // second concurrent insert loses at the index, not at a check.
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_visits_user_zone_period ON visits(user_id, zone_id, period_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_zone_stats_user_zone ON zone_stats(user_id, zone_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_party_members_party_user ON party_members(party_id, user_id)",
        )
        .await?;

        // Partial index: at most one row may ever be active. Two racing
        // period creations resolve at the database instead of handing out
        // two live periods.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_periods_single_active ON periods(is_active) WHERE is_active = 1",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PartyMembers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Characters).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ZoneStats).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Visits).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Periods).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Zones).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
