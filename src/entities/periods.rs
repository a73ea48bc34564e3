use sea_orm::entity::prelude::*;

/// Accounting window for visit uniqueness.
///
/// At most one row has `is_active = true` at any time; rotation deactivates
/// the current row (stamping `end_date`) and inserts a fresh one. Period
/// identifiers are derived from the creation time and never reused.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "periods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub period_id: String,

    pub start_date: String,

    pub end_date: Option<String>,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visits::Entity")]
    Visits,
}

impl Related<super::visits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
