use super::ProgressStatus;
use crate::domain::{ProgressId, SortOrder, TitleId};

/// Point lookup that short-circuits a collection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Progress(ProgressId),
    Title(TitleId),
}

/// What a listing should actually run, after resolving option precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// At most one row; status and search are not applied.
    Point(Lookup),
    Collection {
        sort: SortOrder,
        status: Option<ProgressStatus>,
        search: Option<String>,
        exclude_in_library: bool,
    },
}

/// Independently optional query settings, assembled by chaining setters.
///
/// ```rust
/// use whatdoing::domain::{ProgressId, SortOrder};
/// use whatdoing::progress::{Lookup, ProgressStatus, QueryOptions, QueryPlan};
///
/// let options = QueryOptions::new()
///     .with_search("  bebop ")
///     .with_sort(SortOrder::Descending)
///     .with_status(Some(ProgressStatus::Started));
/// assert_eq!(options.search(), Some("bebop"));
///
/// let point = options.with_progress_id(ProgressId::new(3));
/// assert_eq!(point.plan(), QueryPlan::Point(Lookup::Progress(ProgressId::new(3))));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    search: Option<String>,
    sort: SortOrder,
    status: Option<ProgressStatus>,
    progress_id: Option<ProgressId>,
    title_id: Option<TitleId>,
    exclude_in_library: bool,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search. Blank text clears the option.
    #[must_use]
    pub fn with_search(mut self, query: impl AsRef<str>) -> Self {
        let trimmed = query.as_ref().trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Sort given as text; unrecognized values mean ascending.
    #[must_use]
    pub fn with_sort_str(self, sort: &str) -> Self {
        self.with_sort(SortOrder::parse_lenient(sort))
    }

    #[must_use]
    pub const fn with_status(mut self, status: Option<ProgressStatus>) -> Self {
        self.status = status;
        self
    }

    /// Status given as text; unrecognized values mean no status filter.
    #[must_use]
    pub fn with_status_str(self, status: &str) -> Self {
        self.with_status(ProgressStatus::parse(status))
    }

    #[must_use]
    pub const fn with_progress_id(mut self, id: ProgressId) -> Self {
        self.progress_id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_title_id(mut self, id: TitleId) -> Self {
        self.title_id = Some(id);
        self
    }

    #[must_use]
    pub const fn excluding_library(mut self, exclude: bool) -> Self {
        self.exclude_in_library = exclude;
        self
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    #[must_use]
    pub const fn status(&self) -> Option<ProgressStatus> {
        self.status
    }

    #[must_use]
    pub const fn exclude_in_library(&self) -> bool {
        self.exclude_in_library
    }

    /// Point lookup if one was set. A progress id wins over a title id.
    #[must_use]
    pub const fn lookup(&self) -> Option<Lookup> {
        if let Some(id) = self.progress_id {
            return Some(Lookup::Progress(id));
        }
        if let Some(id) = self.title_id {
            return Some(Lookup::Title(id));
        }
        None
    }

    #[must_use]
    pub fn plan(&self) -> QueryPlan {
        self.lookup().map_or_else(
            || QueryPlan::Collection {
                sort: self.sort,
                status: self.status,
                search: self.search.clone(),
                exclude_in_library: self.exclude_in_library,
            },
            QueryPlan::Point,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mean_no_restriction() {
        let plan = QueryOptions::new().plan();
        assert_eq!(
            plan,
            QueryPlan::Collection {
                sort: SortOrder::Ascending,
                status: None,
                search: None,
                exclude_in_library: false,
            }
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(QueryOptions::new().with_search("   ").search(), None);
        assert_eq!(
            QueryOptions::new().with_search("bebop").with_search("").search(),
            None
        );
    }

    #[test]
    fn unrecognized_text_values_fall_back() {
        let options = QueryOptions::new()
            .with_sort_str("upside-down")
            .with_status_str("dropped");
        assert_eq!(options.sort(), SortOrder::Ascending);
        assert_eq!(options.status(), None);

        let options = QueryOptions::new()
            .with_sort_str("desc")
            .with_status_str("completed");
        assert_eq!(options.sort(), SortOrder::Descending);
        assert_eq!(options.status(), Some(ProgressStatus::Completed));
    }

    #[test]
    fn point_lookup_takes_priority() {
        let options = QueryOptions::new()
            .with_status(Some(ProgressStatus::Completed))
            .with_search("frieren")
            .with_title_id(TitleId::new(9));
        assert_eq!(options.plan(), QueryPlan::Point(Lookup::Title(TitleId::new(9))));

        let options = options.with_progress_id(ProgressId::new(4));
        assert_eq!(
            options.plan(),
            QueryPlan::Point(Lookup::Progress(ProgressId::new(4)))
        );
    }

    #[test]
    fn setter_order_does_not_matter() {
        let a = QueryOptions::new()
            .with_search("kyojin")
            .with_sort(SortOrder::Descending)
            .excluding_library(true);
        let b = QueryOptions::new()
            .excluding_library(true)
            .with_sort(SortOrder::Descending)
            .with_search("kyojin");
        assert_eq!(a, b);
        assert_eq!(a.plan(), b.plan());
    }
}
