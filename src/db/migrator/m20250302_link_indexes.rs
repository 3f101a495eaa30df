use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_title_names_title_name ON title_names(title_id, name_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_title_names_name ON title_names(name_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_library_entries_user_title ON library_entries(user_id, title_id)",
        )
        .await?;

        conn.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_titles_name ON titles(name_id)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for index in [
            "idx_title_names_title_name",
            "idx_title_names_name",
            "idx_library_entries_user_title",
            "idx_titles_name",
        ] {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {index}"))
                .await?;
        }

        Ok(())
    }
}
