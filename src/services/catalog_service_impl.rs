//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{AliasRemoval, Resolved, Store, TitleFields, TitleUpdate};
use crate::domain::{CandidateName, NameId, TitleId, UserId};
use crate::models::{Name, NewTitle, Title, TitleChanges};
use crate::progress::{Lookup, QueryOptions, QueryPlan};
use crate::search::TitleSearchIndex;
use crate::services::catalog_service::{
    CatalogError, CatalogService, ResolvedName, TitleNames,
};

/// Kinds of title the catalog accepts.
const SUPPORTED_KINDS: &[&str] = &["anime"];

pub struct SeaOrmCatalogService {
    store: Store,
    search: TitleSearchIndex,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, search: TitleSearchIndex) -> Self {
        Self { store, search }
    }
}

fn parse_name(text: &str) -> Result<CandidateName, CatalogError> {
    CandidateName::parse(text).map_err(|e| CatalogError::InvalidInput(e.to_string()))
}

fn parse_aliases(aliases: &[String]) -> Result<Vec<CandidateName>, CatalogError> {
    aliases.iter().map(|alias| parse_name(alias)).collect()
}

fn parse_kind(kind: &str) -> Result<String, CatalogError> {
    let kind = kind.trim().to_lowercase();
    if SUPPORTED_KINDS.contains(&kind.as_str()) {
        Ok(kind)
    } else {
        Err(CatalogError::InvalidInput(format!(
            "Unsupported kind '{kind}', expected one of: {}",
            SUPPORTED_KINDS.join(", ")
        )))
    }
}

fn check_episodes(episodes: Option<i32>) -> Result<(), CatalogError> {
    match episodes {
        Some(n) if n < 0 => Err(CatalogError::InvalidInput(
            "Episodes must be non-negative".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Blank optional text is stored as absent.
fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl From<Resolved> for ResolvedName {
    fn from(resolved: Resolved) -> Self {
        Self {
            name: Name::from(resolved.name),
            created: resolved.created,
        }
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn create_title(&self, input: NewTitle) -> Result<Title, CatalogError> {
        let primary = parse_name(&input.name)?;
        let aliases = parse_aliases(&input.aliases)?;
        let kind = parse_kind(&input.kind)?;
        check_episodes(input.episodes)?;

        let fields = TitleFields {
            kind,
            episodes: input.episodes,
            description: non_blank(input.description),
            image_url: non_blank(input.image_url),
        };

        Ok(self.store.titles().create(&primary, fields, &aliases).await?)
    }

    async fn get_title(&self, id: TitleId) -> Result<Title, CatalogError> {
        self.store
            .titles()
            .get(id)
            .await?
            .ok_or(CatalogError::TitleNotFound(id))
    }

    async fn update_title(&self, id: TitleId, changes: TitleChanges) -> Result<Title, CatalogError> {
        check_episodes(changes.episodes)?;

        let update = TitleUpdate {
            name: changes.name.as_deref().map(parse_name).transpose()?,
            episodes: changes.episodes,
            description: changes.description.map(|d| d.trim().to_string()),
            image_url: changes.image_url.map(|u| u.trim().to_string()),
            aliases: parse_aliases(&changes.aliases)?,
        };

        Ok(self.store.titles().update(id, update).await?)
    }

    async fn list_titles(
        &self,
        user: UserId,
        options: &QueryOptions,
    ) -> Result<Vec<Title>, CatalogError> {
        let (sort, search, exclude_in_library) = match options.plan() {
            QueryPlan::Point(lookup) => {
                let title = match lookup {
                    Lookup::Title(id) => self.store.titles().get(id).await?,
                    Lookup::Progress(_) => self
                        .store
                        .library()
                        .get(user, lookup)
                        .await?
                        .map(|entry| entry.title),
                };
                debug!(user_id = %user, ?lookup, found = title.is_some(), "Title point lookup");
                return Ok(title.into_iter().collect());
            }
            QueryPlan::Collection {
                sort,
                search,
                exclude_in_library,
                ..
            } => (sort, search, exclude_in_library),
        };

        let exclude_for = exclude_in_library.then_some(user);
        let titles = self.store.titles().list(sort, exclude_for).await?;

        let Some(query) = search.as_deref() else {
            return Ok(titles);
        };

        let total = titles.len();
        let matched = self.search.filter(titles, query);
        debug!(query, total, matched = matched.len(), "Filtered titles");

        Ok(matched)
    }

    async fn delete_title(&self, id: TitleId) -> Result<(), CatalogError> {
        if !self.store.titles().delete(id).await? {
            return Err(CatalogError::TitleNotFound(id));
        }

        info!(title_id = %id, "Title deleted");
        Ok(())
    }

    async fn list_names(&self, id: TitleId) -> Result<TitleNames, CatalogError> {
        let title = self.get_title(id).await?;

        Ok(TitleNames {
            title_id: title.id,
            primary: title.name,
            aliases: title.aliases,
        })
    }

    async fn resolve_name(&self, text: &str) -> Result<ResolvedName, CatalogError> {
        Ok(self.store.names().resolve_or_create(text).await?.into())
    }

    async fn find_name(&self, text: &str) -> Result<Name, CatalogError> {
        self.store
            .names()
            .find(text)
            .await?
            .map(Name::from)
            .ok_or_else(|| CatalogError::NameNotFound(text.trim().to_string()))
    }

    async fn add_alias(&self, id: TitleId, text: &str) -> Result<ResolvedName, CatalogError> {
        Ok(self.store.names().add_alias(id, text).await?.into())
    }

    async fn remove_aliases(
        &self,
        id: TitleId,
        name_ids: &[NameId],
    ) -> Result<AliasRemoval, CatalogError> {
        if name_ids.is_empty() {
            return Err(CatalogError::InvalidInput(
                "name_ids must not be empty".to_string(),
            ));
        }

        Ok(self.store.names().remove_aliases(id, name_ids).await?)
    }
}
