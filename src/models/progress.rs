use serde::Serialize;

use super::title::Title;
use crate::domain::ProgressId;
use crate::entities::library_entries;
use crate::progress::{ProgressStatus, derive_status};
use crate::search::Searchable;

/// One user's progress on one title, with the status derived on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    pub id: ProgressId,
    pub episode: i32,
    pub status: ProgressStatus,
    pub title: Title,
    pub created_at: String,
    pub updated_at: String,
}

impl ProgressEntry {
    pub(crate) fn assemble(entry: library_entries::Model, title: Title) -> Self {
        Self {
            id: ProgressId::new(entry.id),
            episode: entry.episode,
            status: derive_status(entry.episode, title.episodes),
            title,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl Searchable for ProgressEntry {
    fn primary_name(&self) -> &str {
        self.title.primary_name()
    }

    fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.title.alias_names()
    }
}
