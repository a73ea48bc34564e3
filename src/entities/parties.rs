use sea_orm::entity::prelude::*;

/// A planned group run: who organizes it, where, and when to be ready.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub creator_id: i32,

    pub zone_id: i32,

    pub ready_time: String,

    /// One of `pending`, `confirmed`, `cancelled`.
    pub status: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::zones::Entity",
        from = "Column::ZoneId",
        to = "super::zones::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Zones,
    #[sea_orm(has_many = "super::party_members::Entity")]
    PartyMembers,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::zones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Zones.def()
    }
}

impl Related<super::party_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartyMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
