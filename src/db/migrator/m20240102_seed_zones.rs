use crate::entities::prelude::*;
use crate::entities::zones::Column;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Group instance zones for Lineage 2 High Five.
const ZONES: &[(&str, &str, &str, i32, &str)] = &[
    (
        "kamaloka_hall_abyss",
        "Kamaloka - Hall of the Abyss",
        "Hall of the Abyss Boss",
        50,
        "Group instance requiring tank and healer",
    ),
    (
        "zaken_daytime",
        "Zaken (Daytime)",
        "Zaken",
        55,
        "Daytime Zaken instance for party",
    ),
    (
        "zaken_nighttime",
        "Zaken (Nighttime)",
        "Zaken",
        55,
        "Nighttime Zaken instance for party",
    ),
    (
        "zaken_hard",
        "Zaken (Hard)",
        "Zaken",
        65,
        "Hard mode Zaken instance",
    ),
    (
        "seed_destruction",
        "Seed of Destruction",
        "Tiat",
        78,
        "Raid boss instance for high level parties",
    ),
    (
        "seed_infinity",
        "Seed of Infinity",
        "Twins",
        75,
        "Hall of Suffering - requires full party",
    ),
    (
        "freya_normal",
        "Freya (Normal)",
        "Freya",
        82,
        "Normal Freya instance",
    ),
    (
        "freya_hard",
        "Freya (Hard)",
        "Freya",
        82,
        "Hard Freya instance for experienced groups",
    ),
    (
        "frintezza",
        "Frintezza",
        "Frintezza",
        80,
        "Traditional raid boss instance",
    ),
    (
        "antharas",
        "Antharas",
        "Antharas",
        79,
        "Epic raid boss - requires large raid",
    ),
    (
        "valakas",
        "Valakas",
        "Valakas",
        85,
        "Epic raid boss - requires large raid",
    ),
    ("baium", "Baium", "Baium", 75, "Raid boss instance"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for &(zone_id, name, boss_name, level, description) in ZONES {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Zones)
                .columns([
                    Column::ZoneId,
                    Column::Name,
                    Column::BossName,
                    Column::Level,
                    Column::Description,
                ])
                .values_panic([
                    zone_id.into(),
                    name.into(),
                    boss_name.into(),
                    level.into(),
                    description.into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DELETE FROM zones")
            .await?;

        Ok(())
    }
}
