use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "names")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Trimmed display text as first submitted.
    pub name: String,

    /// Lower-cased, whitespace-collapsed form. One row per key.
    #[sea_orm(unique)]
    pub name_key: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::titles::Entity")]
    Titles,
    #[sea_orm(has_many = "super::title_names::Entity")]
    TitleNames,
}

impl Related<super::title_names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TitleNames.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
