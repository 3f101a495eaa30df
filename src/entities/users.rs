use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored lower-cased.
    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub username: Option<String>,

    /// Argon2id password hash
    pub password_hash: String,

    /// Random API key (64-char hex string)
    #[sea_orm(unique)]
    pub api_key: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::library_entries::Entity")]
    LibraryEntries,
}

impl Related<super::library_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
