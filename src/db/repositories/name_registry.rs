//! Canonical name deduplication.
//!
//! Every write path resolves names through [`resolve_in`], which issues an
//! `INSERT .. ON CONFLICT(name_key) DO NOTHING` before reading the row back.
//! The conditional insert is the first statement of each transaction, so the
//! transaction holds SQLite's write lock from then on and concurrent resolvers
//! of the same text serialize instead of racing a lookup against an insert.

use std::collections::HashSet;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{CandidateName, InvalidName, NameId, TitleId};
use crate::entities::prelude::*;
use crate::entities::{names, title_names, titles};

/// Failures of name resolution and of the title writes built on it.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Title {0} not found")]
    TitleNotFound(TitleId),

    #[error("Name {name_id} is already attached to title {title_id}")]
    DuplicateAlias { title_id: TitleId, name_id: NameId },

    #[error("Title {0} already uses this name as its primary name")]
    TitleExists(TitleId),

    #[error("Title {title_id} cannot have fewer than {watched} episodes, a library entry is past that")]
    EpisodesBelowProgress { title_id: TitleId, watched: i32 },

    #[error("Invalid name: {0}")]
    InvalidName(#[from] InvalidName),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for RegistryError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// A canonical name and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub name: names::Model,
    pub created: bool,
}

/// Result of a partial-success alias removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AliasRemoval {
    pub removed: u64,
    pub failed: Vec<NameId>,
}

pub struct NameRegistry {
    conn: DatabaseConnection,
}

impl NameRegistry {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Finds the canonical name for `text`, creating it if absent.
    pub async fn resolve_or_create(&self, text: &str) -> Result<Resolved, RegistryError> {
        let candidate = CandidateName::parse(text)?;

        let txn = self.conn.begin().await?;
        let resolved = resolve_in(&txn, &candidate).await?;
        txn.commit().await?;

        if resolved.created {
            info!(name_id = resolved.name.id, name = %candidate, "Created canonical name");
        }

        Ok(resolved)
    }

    /// Looks up a canonical name without creating one.
    pub async fn find(&self, text: &str) -> Result<Option<names::Model>, RegistryError> {
        let candidate = CandidateName::parse(text)?;

        let name = Names::find()
            .filter(names::Column::NameKey.eq(candidate.key()))
            .one(&self.conn)
            .await?;

        Ok(name)
    }

    /// Resolves `text` and links it to the title as an alias.
    pub async fn add_alias(&self, title_id: TitleId, text: &str) -> Result<Resolved, RegistryError> {
        let candidate = CandidateName::parse(text)?;

        let txn = self.conn.begin().await?;
        let resolved = attach_alias_in(&txn, title_id, &candidate).await?;
        txn.commit().await?;

        info!(
            title_id = %title_id,
            name_id = resolved.name.id,
            name_created = resolved.created,
            "Alias added"
        );

        Ok(resolved)
    }

    /// Unlinks the given alias names from a title.
    ///
    /// Ids with no link on this title are reported in `failed`; the rest are
    /// removed in one transaction.
    pub async fn remove_aliases(
        &self,
        title_id: TitleId,
        name_ids: &[NameId],
    ) -> Result<AliasRemoval, RegistryError> {
        let txn = self.conn.begin().await?;

        let mut report = AliasRemoval::default();
        let mut seen = HashSet::new();

        for &name_id in name_ids {
            if !seen.insert(name_id) {
                continue;
            }

            let result = TitleNames::delete_many()
                .filter(title_names::Column::TitleId.eq(title_id.value()))
                .filter(title_names::Column::NameId.eq(name_id.value()))
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                report.failed.push(name_id);
            } else {
                report.removed += result.rows_affected;
            }
        }

        if report.removed == 0 && Titles::find_by_id(title_id.value()).one(&txn).await?.is_none() {
            return Err(RegistryError::TitleNotFound(title_id));
        }

        txn.commit().await?;

        debug!(
            title_id = %title_id,
            removed = report.removed,
            failed = report.failed.len(),
            "Aliases removed"
        );

        Ok(report)
    }
}

/// Resolves a name inside the caller's transaction.
pub async fn resolve_in<C: ConnectionTrait>(
    conn: &C,
    candidate: &CandidateName,
) -> Result<Resolved, DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    let inserted = Names::insert(names::ActiveModel {
        name: Set(candidate.display().to_string()),
        name_key: Set(candidate.key().to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(names::Column::NameKey)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let name = Names::find()
        .filter(names::Column::NameKey.eq(candidate.key()))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("name '{}'", candidate.key())))?;

    Ok(Resolved {
        name,
        created: inserted > 0,
    })
}

/// Resolves `candidate` and links it to a title inside the caller's transaction.
///
/// Fails with [`RegistryError::DuplicateAlias`] when the name is already the
/// title's primary name or already linked to it.
pub async fn attach_alias_in<C: ConnectionTrait>(
    conn: &C,
    title_id: TitleId,
    candidate: &CandidateName,
) -> Result<Resolved, RegistryError> {
    let resolved = resolve_in(conn, candidate).await?;

    let title = Titles::find_by_id(title_id.value())
        .one(conn)
        .await?
        .ok_or(RegistryError::TitleNotFound(title_id))?;

    let duplicate = RegistryError::DuplicateAlias {
        title_id,
        name_id: NameId::new(resolved.name.id),
    };

    if title.name_id == resolved.name.id {
        return Err(duplicate);
    }

    let linked = TitleNames::insert(title_names::ActiveModel {
        title_id: Set(title.id),
        name_id: Set(resolved.name.id),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([title_names::Column::TitleId, title_names::Column::NameId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    if linked == 0 {
        return Err(duplicate);
    }

    Ok(resolved)
}

/// Title currently using `name_id` as its primary name, other than `except`.
pub(crate) async fn primary_owner<C: ConnectionTrait>(
    conn: &C,
    name_id: i32,
    except: Option<TitleId>,
) -> Result<Option<TitleId>, DbErr> {
    let mut query = Titles::find().filter(titles::Column::NameId.eq(name_id));
    if let Some(except) = except {
        query = query.filter(titles::Column::Id.ne(except.value()));
    }

    Ok(query.one(conn).await?.map(|t| TitleId::new(t.id)))
}
