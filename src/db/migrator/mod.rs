use sea_orm_migration::prelude::*;

mod m20250301_create_catalog;
mod m20250302_link_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_create_catalog::Migration),
            Box::new(m20250302_link_indexes::Migration),
        ]
    }
}
