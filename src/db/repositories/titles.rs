use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use super::name_registry::{RegistryError, attach_alias_in, primary_owner, resolve_in};
use crate::domain::{CandidateName, SortOrder, TitleId, UserId};
use crate::entities::prelude::*;
use crate::entities::{library_entries, names, title_names, titles};
use crate::models::Title;

/// Scalar title fields, already validated.
#[derive(Debug, Clone, Default)]
pub struct TitleFields {
    pub kind: String,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default)]
pub struct TitleUpdate {
    pub name: Option<CandidateName>,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub aliases: Vec<CandidateName>,
}

pub struct TitleRepository {
    conn: DatabaseConnection,
}

impl TitleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Registers a title under `primary`, linking every alias.
    ///
    /// Aliases that fold to the primary name or to an earlier alias are skipped.
    pub async fn create(
        &self,
        primary: &CandidateName,
        fields: TitleFields,
        aliases: &[CandidateName],
    ) -> Result<Title, RegistryError> {
        let txn = self.conn.begin().await?;

        let resolved = resolve_in(&txn, primary).await?;
        if let Some(existing) = primary_owner(&txn, resolved.name.id, None).await? {
            return Err(RegistryError::TitleExists(existing));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let title = titles::ActiveModel {
            name_id: Set(resolved.name.id),
            kind: Set(fields.kind),
            episodes: Set(fields.episodes),
            description: Set(fields.description),
            image_url: Set(fields.image_url),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let title_id = TitleId::new(title.id);
        link_aliases(&txn, title_id, aliases).await?;

        let created = load_title(&txn, title_id)
            .await?
            .ok_or(RegistryError::TitleNotFound(title_id))?;

        txn.commit().await?;

        info!(title_id = %title_id, name = %primary, aliases = created.aliases.len(), "Title created");
        Ok(created)
    }

    /// Applies `update` in one transaction and returns the new state.
    pub async fn update(&self, id: TitleId, update: TitleUpdate) -> Result<Title, RegistryError> {
        let txn = self.conn.begin().await?;

        let mut statement = Titles::update_many()
            .col_expr(
                titles::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(titles::Column::Id.eq(id.value()));

        if let Some(episodes) = update.episodes {
            statement = statement.col_expr(titles::Column::Episodes, Expr::value(episodes));
        }
        if let Some(description) = update.description {
            statement = statement.col_expr(titles::Column::Description, Expr::value(description));
        }
        if let Some(image_url) = update.image_url {
            statement = statement.col_expr(titles::Column::ImageUrl, Expr::value(image_url));
        }

        if statement.exec(&txn).await?.rows_affected == 0 {
            return Err(RegistryError::TitleNotFound(id));
        }

        if let Some(episodes) = update.episodes {
            let ahead = LibraryEntries::find()
                .filter(library_entries::Column::TitleId.eq(id.value()))
                .filter(library_entries::Column::Episode.gt(episodes))
                .count(&txn)
                .await?;

            if ahead > 0 {
                return Err(RegistryError::EpisodesBelowProgress {
                    title_id: id,
                    watched: episodes,
                });
            }
        }

        if let Some(name) = &update.name {
            let resolved = resolve_in(&txn, name).await?;
            if let Some(existing) = primary_owner(&txn, resolved.name.id, Some(id)).await? {
                return Err(RegistryError::TitleExists(existing));
            }

            Titles::update_many()
                .col_expr(titles::Column::NameId, Expr::value(resolved.name.id))
                .filter(titles::Column::Id.eq(id.value()))
                .exec(&txn)
                .await?;

            // The new primary name may not also be one of its aliases.
            TitleNames::delete_many()
                .filter(title_names::Column::TitleId.eq(id.value()))
                .filter(title_names::Column::NameId.eq(resolved.name.id))
                .exec(&txn)
                .await?;
        }

        link_aliases(&txn, id, &update.aliases).await?;

        let updated = load_title(&txn, id)
            .await?
            .ok_or(RegistryError::TitleNotFound(id))?;

        txn.commit().await?;

        info!(title_id = %id, "Title updated");
        Ok(updated)
    }

    pub async fn get(&self, id: TitleId) -> Result<Option<Title>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open read transaction")?;

        let title = load_title(&txn, id)
            .await
            .with_context(|| format!("Failed to load title {id}"))?;

        txn.commit().await?;
        Ok(title)
    }

    /// Lists titles ordered by primary name.
    ///
    /// With `exclude_library_of`, titles already in that user's library are left out.
    pub async fn list(&self, sort: SortOrder, exclude_library_of: Option<UserId>) -> Result<Vec<Title>> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open read transaction")?;

        let mut query = Titles::find().join(JoinType::InnerJoin, titles::Relation::PrimaryName.def());

        if let Some(user_id) = exclude_library_of {
            query = query.filter(
                titles::Column::Id.not_in_subquery(
                    Query::select()
                        .column(library_entries::Column::TitleId)
                        .from(LibraryEntries)
                        .and_where(library_entries::Column::UserId.eq(user_id.value()))
                        .to_owned(),
                ),
            );
        }

        let rows = query
            .order_by(names::Column::NameKey, order_for(sort))
            .order_by_asc(titles::Column::Id)
            .all(&txn)
            .await
            .context("Failed to list titles")?;

        let titles = assemble_titles(&txn, rows)
            .await
            .context("Failed to load title names")?;

        txn.commit().await?;
        Ok(titles)
    }

    /// Deletes a title. Alias links and library entries go with it; names stay.
    pub async fn delete(&self, id: TitleId) -> Result<bool> {
        let result = Titles::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to delete title {id}"))?;

        Ok(result.rows_affected > 0)
    }
}

pub(crate) const fn order_for(sort: SortOrder) -> Order {
    if sort.is_ascending() {
        Order::Asc
    } else {
        Order::Desc
    }
}

async fn link_aliases<C: ConnectionTrait>(
    conn: &C,
    title_id: TitleId,
    aliases: &[CandidateName],
) -> Result<(), RegistryError> {
    for alias in aliases {
        match attach_alias_in(conn, title_id, alias).await {
            Ok(_) | Err(RegistryError::DuplicateAlias { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Loads one title with its primary name and aliases.
pub(crate) async fn load_title<C: ConnectionTrait>(
    conn: &C,
    id: TitleId,
) -> Result<Option<Title>, DbErr> {
    let Some(title) = Titles::find_by_id(id.value()).one(conn).await? else {
        return Ok(None);
    };

    Ok(assemble_titles(conn, vec![title]).await?.pop())
}

/// Attaches primary names and aliases to title rows, keeping their order.
pub(crate) async fn assemble_titles<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<titles::Model>,
) -> Result<Vec<Title>, DbErr> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let name_ids: Vec<i32> = rows.iter().map(|t| t.name_id).collect();
    let primaries: HashMap<i32, names::Model> = Names::find()
        .filter(names::Column::Id.is_in(name_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|name| (name.id, name))
        .collect();

    let title_ids: Vec<i32> = rows.iter().map(|t| t.id).collect();
    let mut aliases = load_aliases(conn, title_ids).await?;

    let mut assembled = Vec::with_capacity(rows.len());
    for title in rows {
        // Several titles may share a name row, so clone rather than remove.
        let Some(name) = primaries.get(&title.name_id).cloned() else {
            warn!(title_id = title.id, name_id = title.name_id, "Title has no primary name row");
            continue;
        };
        let title_aliases = aliases.remove(&title.id).unwrap_or_default();
        assembled.push(Title::assemble(title, name, title_aliases));
    }

    Ok(assembled)
}

async fn load_aliases<C: ConnectionTrait>(
    conn: &C,
    title_ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<names::Model>>, DbErr> {
    let links = TitleNames::find()
        .find_also_related(Names)
        .filter(title_names::Column::TitleId.is_in(title_ids))
        .order_by_asc(title_names::Column::Id)
        .all(conn)
        .await?;

    let mut by_title: HashMap<i32, Vec<names::Model>> = HashMap::new();
    for (link, name) in links {
        if let Some(name) = name {
            by_title.entry(link.title_id).or_default().push(name);
        }
    }

    Ok(by_title)
}
