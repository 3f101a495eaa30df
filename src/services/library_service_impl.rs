//! `SeaORM` implementation of the `LibraryService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{AddOutcome, Store, UpdateOutcome};
use crate::domain::{ProgressId, TitleId, UserId};
use crate::models::ProgressEntry;
use crate::progress::{Lookup, ProgressStatus, QueryOptions, QueryPlan, episode_for_status};
use crate::search::TitleSearchIndex;
use crate::services::library_service::{LibraryError, LibraryService};

pub struct SeaOrmLibraryService {
    store: Store,
    search: TitleSearchIndex,
}

impl SeaOrmLibraryService {
    #[must_use]
    pub const fn new(store: Store, search: TitleSearchIndex) -> Self {
        Self { store, search }
    }

    fn finish_update(id: ProgressId, outcome: UpdateOutcome) -> Result<ProgressEntry, LibraryError> {
        match outcome {
            UpdateOutcome::Updated(entry) => Ok(entry),
            UpdateOutcome::NotFound => Err(LibraryError::EntryNotFound(id)),
            UpdateOutcome::Rejected => Err(LibraryError::Rejected(id)),
        }
    }
}

#[async_trait]
impl LibraryService for SeaOrmLibraryService {
    async fn add(&self, user: UserId, title_id: TitleId) -> Result<ProgressEntry, LibraryError> {
        match self.store.library().add(user, title_id).await? {
            AddOutcome::Added(entry) => Ok(entry),
            AddOutcome::AlreadyInLibrary => Err(LibraryError::AlreadyInLibrary(title_id)),
            AddOutcome::TitleNotFound => Err(LibraryError::TitleNotFound(title_id)),
        }
    }

    async fn progress(
        &self,
        user: UserId,
        options: &QueryOptions,
    ) -> Result<Vec<ProgressEntry>, LibraryError> {
        match options.plan() {
            QueryPlan::Point(lookup) => {
                let entry = self.store.library().get(user, lookup).await?;
                debug!(user_id = %user, ?lookup, found = entry.is_some(), "Progress point lookup");
                Ok(entry.into_iter().collect())
            }
            QueryPlan::Collection {
                sort,
                status,
                search,
                ..
            } => {
                let entries = self.store.library().list(user, status, sort).await?;

                Ok(match search {
                    Some(query) => self.search.filter(entries, &query),
                    None => entries,
                })
            }
        }
    }

    async fn set_episode(
        &self,
        user: UserId,
        id: ProgressId,
        episode: i32,
    ) -> Result<ProgressEntry, LibraryError> {
        if episode < 0 {
            return Err(LibraryError::InvalidInput(
                "Episode must be non-negative".to_string(),
            ));
        }

        let outcome = self.store.library().set_episode(user, id, episode, None).await?;
        let entry = Self::finish_update(id, outcome)?;

        info!(user_id = %user, progress_id = %id, episode, status = %entry.status, "Episode updated");
        Ok(entry)
    }

    async fn set_status(
        &self,
        user: UserId,
        id: ProgressId,
        status: ProgressStatus,
    ) -> Result<ProgressEntry, LibraryError> {
        let current = self
            .store
            .library()
            .get(user, Lookup::Progress(id))
            .await?
            .ok_or(LibraryError::EntryNotFound(id))?;

        if current.status == status {
            return Ok(current);
        }

        let next = episode_for_status(status, current.episode, current.title.episodes)
            .ok_or(LibraryError::Rejected(id))?;

        // Guarded on the counter we read so a concurrent write is not overwritten.
        let outcome = self
            .store
            .library()
            .set_episode(user, id, next, Some(current.episode))
            .await?;
        let entry = Self::finish_update(id, outcome)?;

        info!(user_id = %user, progress_id = %id, episode = next, status = %status, "Status updated");
        Ok(entry)
    }

    async fn remove(&self, user: UserId, id: ProgressId) -> Result<(), LibraryError> {
        if !self.store.library().remove(user, id).await? {
            return Err(LibraryError::EntryNotFound(id));
        }

        info!(user_id = %user, progress_id = %id, "Removed from library");
        Ok(())
    }
}
