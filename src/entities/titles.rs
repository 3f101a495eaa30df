use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "titles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Primary name.
    pub name_id: i32,

    pub kind: String,

    /// Total episode count, when known.
    pub episodes: Option<i32>,

    pub description: Option<String>,

    pub image_url: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::names::Entity",
        from = "Column::NameId",
        to = "super::names::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    PrimaryName,
    #[sea_orm(has_many = "super::title_names::Entity")]
    TitleNames,
    #[sea_orm(has_many = "super::library_entries::Entity")]
    LibraryEntries,
}

impl Related<super::names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrimaryName.def()
    }
}

impl Related<super::title_names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TitleNames.def()
    }
}

impl Related<super::library_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
