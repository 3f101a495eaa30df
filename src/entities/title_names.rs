use sea_orm::entity::prelude::*;

/// Alias link between a title and a name other than its primary one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "title_names")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title_id: i32,
    pub name_id: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::titles::Entity",
        from = "Column::TitleId",
        to = "super::titles::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Title,
    #[sea_orm(
        belongs_to = "super::names::Entity",
        from = "Column::NameId",
        to = "super::names::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Name,
}

impl Related<super::titles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Title.def()
    }
}

impl Related<super::names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Name.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
