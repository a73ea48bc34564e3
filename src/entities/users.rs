use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Telegram-issued numeric user id, the external identity anchor.
    #[sea_orm(unique)]
    pub telegram_id: i64,

    pub username: Option<String>,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub timezone: String,

    pub language: String,

    pub character_name: Option<String>,

    pub character_level: Option<i32>,

    /// Argon2id password hash, absent until the user sets a password.
    pub password_hash: Option<String>,

    /// One-time numeric reset code, cleared after use.
    pub password_reset_code: Option<String>,

    pub password_reset_expiry: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visits::Entity")]
    Visits,
    #[sea_orm(has_many = "super::characters::Entity")]
    Characters,
}

impl Related<super::visits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl Related<super::characters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Characters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
