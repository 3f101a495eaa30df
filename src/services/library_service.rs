//! Domain service for a user's library: which titles they track and how far
//! they have watched.

use thiserror::Error;

use crate::domain::{ProgressId, TitleId, UserId};
use crate::models::ProgressEntry;
use crate::progress::{ProgressStatus, QueryOptions};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library entry not found: {0}")]
    EntryNotFound(ProgressId),

    #[error("Title not found: {0}")]
    TitleNotFound(TitleId),

    #[error("Title {0} is already in the library")]
    AlreadyInLibrary(TitleId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The entry exists but the requested change would decrease the counter
    /// or pass the title's episode count.
    #[error("Progress update rejected for entry {0}")]
    Rejected(ProgressId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait LibraryService: Send + Sync {
    /// Starts tracking a title at episode 0.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::TitleNotFound`] if the title does not exist
    /// - [`LibraryError::AlreadyInLibrary`] on a second add
    async fn add(&self, user: UserId, title_id: TitleId) -> Result<ProgressEntry, LibraryError>;

    /// Runs a progress query. A point lookup ignores status and search.
    async fn progress(
        &self,
        user: UserId,
        options: &QueryOptions,
    ) -> Result<Vec<ProgressEntry>, LibraryError>;

    /// Sets the episode counter.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Rejected`] if the counter would decrease or
    /// pass the title's total.
    async fn set_episode(
        &self,
        user: UserId,
        id: ProgressId,
        episode: i32,
    ) -> Result<ProgressEntry, LibraryError>;

    /// Moves an entry into `status` by writing the matching counter.
    async fn set_status(
        &self,
        user: UserId,
        id: ProgressId,
        status: ProgressStatus,
    ) -> Result<ProgressEntry, LibraryError>;

    async fn remove(&self, user: UserId, id: ProgressId) -> Result<(), LibraryError>;
}
