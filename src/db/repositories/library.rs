use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use tracing::{debug, info};

use super::titles::{assemble_titles, load_title, order_for};
use crate::domain::{ProgressId, SortOrder, TitleId, UserId};
use crate::entities::prelude::*;
use crate::entities::{library_entries, titles};
use crate::models::{ProgressEntry, Title};
use crate::progress::{Lookup, ProgressStatus};

#[derive(Debug)]
pub enum AddOutcome {
    Added(ProgressEntry),
    AlreadyInLibrary,
    TitleNotFound,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(ProgressEntry),
    NotFound,
    /// The entry exists but the new counter was refused.
    Rejected,
}

pub struct LibraryRepository {
    conn: DatabaseConnection,
}

impl LibraryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Adds a title to a user's library with the counter at zero.
    ///
    /// The insert selects from `titles`, so a missing title inserts nothing
    /// instead of tripping the foreign key.
    pub async fn add(&self, user_id: UserId, title_id: TitleId) -> Result<AddOutcome> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        let source = Query::select()
            .expr(Expr::value(user_id.value()))
            .expr(Expr::value(title_id.value()))
            .expr(Expr::value(0))
            .expr(Expr::value(now.clone()))
            .expr(Expr::value(now))
            .from(Titles)
            .and_where(titles::Column::Id.eq(title_id.value()))
            .to_owned();

        let mut insert = Query::insert();
        insert.into_table(LibraryEntries).columns([
            library_entries::Column::UserId,
            library_entries::Column::TitleId,
            library_entries::Column::Episode,
            library_entries::Column::CreatedAt,
            library_entries::Column::UpdatedAt,
        ]);
        insert
            .select_from(source)
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        insert.on_conflict(
            OnConflict::columns([
                library_entries::Column::UserId,
                library_entries::Column::TitleId,
            ])
            .do_nothing()
            .to_owned(),
        );

        let backend = txn.get_database_backend();
        let inserted = txn
            .execute(backend.build(&insert))
            .await
            .context("Failed to insert library entry")?
            .rows_affected();

        if inserted == 0 {
            let title_exists = Titles::find_by_id(title_id.value()).one(&txn).await?.is_some();
            txn.commit().await?;

            return Ok(if title_exists {
                AddOutcome::AlreadyInLibrary
            } else {
                AddOutcome::TitleNotFound
            });
        }

        let entry = LibraryEntries::find()
            .filter(library_entries::Column::UserId.eq(user_id.value()))
            .filter(library_entries::Column::TitleId.eq(title_id.value()))
            .one(&txn)
            .await?;
        let progress = match entry {
            Some(entry) => with_title(&txn, entry).await?,
            None => None,
        };

        txn.commit().await?;

        let Some(progress) = progress else {
            return Ok(AddOutcome::TitleNotFound);
        };

        info!(user_id = %user_id, title_id = %title_id, progress_id = %progress.id, "Added to library");
        Ok(AddOutcome::Added(progress))
    }

    /// Single entry of this user's library, by progress id or title id.
    pub async fn get(&self, user_id: UserId, lookup: Lookup) -> Result<Option<ProgressEntry>> {
        let txn = self.conn.begin().await?;

        let query = LibraryEntries::find()
            .filter(library_entries::Column::UserId.eq(user_id.value()));
        let query = match lookup {
            Lookup::Progress(id) => query.filter(library_entries::Column::Id.eq(id.value())),
            Lookup::Title(id) => query.filter(library_entries::Column::TitleId.eq(id.value())),
        };

        let progress = match query.one(&txn).await.context("Failed to query library entry")? {
            Some(entry) => with_title(&txn, entry).await?,
            None => None,
        };

        txn.commit().await?;
        Ok(progress)
    }

    /// The user's library ordered by primary name, optionally narrowed to one status.
    pub async fn list(
        &self,
        user_id: UserId,
        status: Option<ProgressStatus>,
        sort: SortOrder,
    ) -> Result<Vec<ProgressEntry>> {
        let txn = self.conn.begin().await?;

        let mut query = LibraryEntries::find()
            .join(JoinType::InnerJoin, library_entries::Relation::Title.def())
            .join(JoinType::InnerJoin, titles::Relation::PrimaryName.def())
            .filter(library_entries::Column::UserId.eq(user_id.value()));

        if let Some(status) = status {
            query = query.filter(status_condition(status));
        }

        let entries = query
            .order_by(crate::entities::names::Column::NameKey, order_for(sort))
            .order_by_asc(library_entries::Column::Id)
            .all(&txn)
            .await
            .context("Failed to list library entries")?;

        let title_ids: Vec<i32> = entries.iter().map(|e| e.title_id).collect();
        let title_rows = Titles::find()
            .filter(titles::Column::Id.is_in(title_ids))
            .all(&txn)
            .await?;
        let titles: HashMap<TitleId, Title> = assemble_titles(&txn, title_rows)
            .await?
            .into_iter()
            .map(|title| (title.id, title))
            .collect();

        txn.commit().await?;

        let progress = entries
            .into_iter()
            .filter_map(|entry| {
                let title = titles.get(&TitleId::new(entry.title_id))?.clone();
                Some(ProgressEntry::assemble(entry, title))
            })
            .collect();

        Ok(progress)
    }

    /// Moves the counter to `next`.
    ///
    /// The write only applies when the counter does not decrease, `next` does
    /// not pass the title's known total, and, if given, the counter still
    /// equals `expected`.
    pub async fn set_episode(
        &self,
        user_id: UserId,
        id: ProgressId,
        next: i32,
        expected: Option<i32>,
    ) -> Result<UpdateOutcome> {
        let txn = self.conn.begin().await?;

        let within_total = Query::select()
            .column(titles::Column::Id)
            .from(Titles)
            .cond_where(
                Condition::any()
                    .add(titles::Column::Episodes.is_null())
                    .add(titles::Column::Episodes.gte(next)),
            )
            .to_owned();

        let mut update = LibraryEntries::update_many()
            .col_expr(library_entries::Column::Episode, Expr::value(next))
            .col_expr(
                library_entries::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(library_entries::Column::Id.eq(id.value()))
            .filter(library_entries::Column::UserId.eq(user_id.value()))
            .filter(library_entries::Column::Episode.lte(next))
            .filter(library_entries::Column::TitleId.in_subquery(within_total));

        if let Some(expected) = expected {
            update = update.filter(library_entries::Column::Episode.eq(expected));
        }

        let updated = update
            .exec(&txn)
            .await
            .context("Failed to update episode counter")?
            .rows_affected;

        let entry = LibraryEntries::find_by_id(id.value())
            .filter(library_entries::Column::UserId.eq(user_id.value()))
            .one(&txn)
            .await?;

        let outcome = match entry {
            None => UpdateOutcome::NotFound,
            Some(entry) if updated == 0 => {
                debug!(progress_id = %id, current = entry.episode, next, "Episode update rejected");
                UpdateOutcome::Rejected
            }
            Some(entry) => match with_title(&txn, entry).await? {
                Some(progress) => UpdateOutcome::Updated(progress),
                None => UpdateOutcome::NotFound,
            },
        };

        txn.commit().await?;
        Ok(outcome)
    }

    pub async fn remove(&self, user_id: UserId, id: ProgressId) -> Result<bool> {
        let result = LibraryEntries::delete_many()
            .filter(library_entries::Column::Id.eq(id.value()))
            .filter(library_entries::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to remove library entry {id}"))?;

        Ok(result.rows_affected > 0)
    }
}

async fn with_title<C: ConnectionTrait>(
    conn: &C,
    entry: library_entries::Model,
) -> Result<Option<ProgressEntry>, DbErr> {
    let title = load_title(conn, TitleId::new(entry.title_id)).await?;
    Ok(title.map(|title| ProgressEntry::assemble(entry, title)))
}

/// SQL form of the derived status, evaluated against the joined title row.
fn status_condition(status: ProgressStatus) -> Condition {
    let watched = || Expr::col((LibraryEntries, library_entries::Column::Episode));
    let total = || Expr::col((Titles, titles::Column::Episodes));

    match status {
        ProgressStatus::NotStarted => {
            Condition::all().add(library_entries::Column::Episode.lte(0))
        }
        ProgressStatus::Started => Condition::all()
            .add(library_entries::Column::Episode.gt(0))
            .add(
                Condition::any()
                    .add(titles::Column::Episodes.is_null())
                    .add(watched().lt(total())),
            ),
        ProgressStatus::Completed => Condition::all()
            .add(library_entries::Column::Episode.gt(0))
            .add(titles::Column::Episodes.is_not_null())
            .add(watched().gte(total())),
    }
}
