//! Domain service for the title catalog: titles, canonical names and aliases.

use serde::Serialize;
use thiserror::Error;

use crate::db::{AliasRemoval, RegistryError};
use crate::domain::{NameId, TitleId, UserId};
use crate::models::{Name, NewTitle, Title, TitleChanges};
use crate::progress::QueryOptions;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Title not found: {0}")]
    TitleNotFound(TitleId),

    #[error("Name not found: {0}")]
    NameNotFound(String),

    #[error("Name {name_id} is already an alias or the primary name of title {title_id}")]
    DuplicateAlias { title_id: TitleId, name_id: NameId },

    #[error("Title {0} already uses this primary name")]
    TitleExists(TitleId),

    #[error("Title {title_id} has library entries past episode {episodes}")]
    EpisodesBelowProgress { title_id: TitleId, episodes: i32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<RegistryError> for CatalogError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::TitleNotFound(id) => Self::TitleNotFound(id),
            RegistryError::DuplicateAlias { title_id, name_id } => {
                Self::DuplicateAlias { title_id, name_id }
            }
            RegistryError::TitleExists(id) => Self::TitleExists(id),
            RegistryError::EpisodesBelowProgress { title_id, watched } => {
                Self::EpisodesBelowProgress {
                    title_id,
                    episodes: watched,
                }
            }
            RegistryError::InvalidName(e) => Self::InvalidInput(e.to_string()),
            RegistryError::Database(msg) => Self::Database(msg),
        }
    }
}

/// A resolved canonical name and whether the call created it.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedName {
    pub name: Name,
    pub created: bool,
}

/// Primary name and aliases of one title.
#[derive(Debug, Clone, Serialize)]
pub struct TitleNames {
    pub title_id: TitleId,
    pub primary: Name,
    pub aliases: Vec<Name>,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Registers a title with its primary name and aliases in one transaction.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidInput`] for a blank name or an unsupported kind
    /// - [`CatalogError::TitleExists`] when another title already has this primary name
    async fn create_title(&self, input: NewTitle) -> Result<Title, CatalogError>;

    async fn get_title(&self, id: TitleId) -> Result<Title, CatalogError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EpisodesBelowProgress`] when the new total is
    /// below some library entry's counter.
    async fn update_title(&self, id: TitleId, changes: TitleChanges) -> Result<Title, CatalogError>;

    /// Titles ordered by primary name, narrowed by `search` and optionally
    /// excluding those already in `user`'s library.
    ///
    /// A `title_id` or `progress_id` turns this into a point lookup of at
    /// most one title; the other options are then ignored.
    async fn list_titles(
        &self,
        user: UserId,
        options: &QueryOptions,
    ) -> Result<Vec<Title>, CatalogError>;

    async fn delete_title(&self, id: TitleId) -> Result<(), CatalogError>;

    async fn list_names(&self, id: TitleId) -> Result<TitleNames, CatalogError>;

    /// Finds or creates a canonical name. Repeating the call is a no-op.
    async fn resolve_name(&self, text: &str) -> Result<ResolvedName, CatalogError>;

    async fn find_name(&self, text: &str) -> Result<Name, CatalogError>;

    /// Links `text` to a title as an alias.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateAlias`] if the name is already linked
    /// or is the title's primary name.
    async fn add_alias(&self, id: TitleId, text: &str) -> Result<ResolvedName, CatalogError>;

    /// Unlinks aliases; ids without a link come back in `failed`.
    async fn remove_aliases(
        &self,
        id: TitleId,
        name_ids: &[NameId],
    ) -> Result<AliasRemoval, CatalogError>;
}
