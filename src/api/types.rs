use serde::{Deserialize, Serialize};

use crate::domain::{NameId, ProgressId, TitleId};
use crate::models::{Name, NewTitle, TitleChanges};
use crate::progress::{ProgressStatus, QueryOptions};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query-string options shared by title and library listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub progress_id: Option<i32>,
    pub title_id: Option<i32>,
    #[serde(default)]
    pub exclude_in_library: bool,
}

impl ListQuery {
    #[must_use]
    pub fn options(&self) -> QueryOptions {
        let mut options = QueryOptions::new().excluding_library(self.exclude_in_library);

        if let Some(search) = &self.search {
            options = options.with_search(search);
        }
        if let Some(sort) = &self.sort {
            options = options.with_sort_str(sort);
        }
        if let Some(status) = &self.status {
            options = options.with_status_str(status);
        }
        if let Some(id) = self.title_id {
            options = options.with_title_id(TitleId::new(id));
        }
        if let Some(id) = self.progress_id {
            options = options.with_progress_id(ProgressId::new(id));
        }

        options
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub kind: String,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl From<CreateTitleRequest> for NewTitle {
    fn from(req: CreateTitleRequest) -> Self {
        Self {
            name: req.name,
            kind: req.kind,
            episodes: req.episodes,
            description: req.description,
            image_url: req.image_url,
            aliases: req.aliases,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl From<UpdateTitleRequest> for TitleChanges {
    fn from(req: UpdateTitleRequest) -> Self {
        Self {
            name: req.name,
            episodes: req.episodes,
            description: req.description,
            image_url: req.image_url,
            aliases: req.aliases,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveAliasesRequest {
    pub name_ids: Vec<NameId>,
}

#[derive(Debug, Serialize)]
pub struct NameResponse {
    pub name: Name,
    pub created: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddToLibraryRequest {
    pub title_id: TitleId,
}

#[derive(Debug, Deserialize)]
pub struct SetEpisodeRequest {
    pub episode: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

impl SetStatusRequest {
    #[must_use]
    pub fn status(&self) -> Option<ProgressStatus> {
        ProgressStatus::parse(&self.status)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Lookup, QueryPlan};

    #[test]
    fn list_query_builds_options() {
        let query = ListQuery {
            search: Some(" bebop ".to_string()),
            sort: Some("desc".to_string()),
            status: Some("started".to_string()),
            ..ListQuery::default()
        };
        let options = query.options();
        assert_eq!(options.search(), Some("bebop"));
        assert!(!options.sort().is_ascending());
        assert_eq!(options.status(), Some(ProgressStatus::Started));
    }

    #[test]
    fn list_query_point_lookup_prefers_progress_id() {
        let query = ListQuery {
            progress_id: Some(7),
            title_id: Some(2),
            ..ListQuery::default()
        };
        assert_eq!(
            query.options().plan(),
            QueryPlan::Point(Lookup::Progress(ProgressId::new(7)))
        );
    }
}
