//! Free-text title search over a title's primary name and aliases.
//!
//! There is no ranking. A title either matches a query or it does not, and
//! callers keep whatever order their listing query already produced.

use crate::matching::{find, within_distance};

/// Default ceiling for approximate matches, in edits.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

/// Anything that carries a primary name and a set of aliases.
pub trait Searchable {
    fn primary_name(&self) -> &str;

    fn alias_names(&self) -> impl Iterator<Item = &str>;
}

/// Query text after case folding and whitespace normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FoldedQuery {
    text: String,
    words: usize,
}

impl FoldedQuery {
    fn new(query: &str) -> Option<Self> {
        let words: Vec<&str> = query.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }

        let text = words.join(" ").to_lowercase();
        Some(Self {
            words: words.len(),
            text,
        })
    }
}

/// Boolean title matcher with a single edit-distance threshold.
///
/// A name matches when the query occurs in it verbatim (KMP), or when the
/// query is within `max_edit_distance` edits of the whole name or of any run
/// of consecutive words in the name with the query's word count. Names are
/// tried primary first, then aliases, stopping at the first hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleSearchIndex {
    max_edit_distance: usize,
}

impl Default for TitleSearchIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDIT_DISTANCE)
    }
}

impl TitleSearchIndex {
    #[must_use]
    pub const fn new(max_edit_distance: usize) -> Self {
        Self { max_edit_distance }
    }

    #[must_use]
    pub const fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    /// Whether `title` matches `query`. A blank query matches everything.
    #[must_use]
    pub fn matches<T: Searchable>(&self, title: &T, query: &str) -> bool {
        FoldedQuery::new(query).is_none_or(|query| self.matches_folded(title, &query))
    }

    /// Keeps the titles matching `query`, preserving input order.
    #[must_use]
    pub fn filter<T: Searchable>(&self, titles: Vec<T>, query: &str) -> Vec<T> {
        let Some(query) = FoldedQuery::new(query) else {
            return titles;
        };

        titles
            .into_iter()
            .filter(|title| self.matches_folded(title, &query))
            .collect()
    }

    fn matches_folded<T: Searchable>(&self, title: &T, query: &FoldedQuery) -> bool {
        std::iter::once(title.primary_name())
            .chain(title.alias_names())
            .any(|name| self.name_matches(&name.to_lowercase(), query))
    }

    fn name_matches(&self, name: &str, query: &FoldedQuery) -> bool {
        if find(name, &query.text).is_some() {
            return true;
        }

        if within_distance(name, &query.text, self.max_edit_distance) {
            return true;
        }

        let words: Vec<&str> = name.split_whitespace().collect();
        if query.words >= words.len() {
            return false;
        }

        words.windows(query.words).any(|window| {
            within_distance(&window.join(" "), &query.text, self.max_edit_distance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Named {
        primary: String,
        aliases: Vec<String>,
    }

    fn named(primary: &str, aliases: &[&str]) -> Named {
        Named {
            primary: primary.to_string(),
            aliases: aliases.iter().map(ToString::to_string).collect(),
        }
    }

    impl Searchable for Named {
        fn primary_name(&self) -> &str {
            &self.primary
        }

        fn alias_names(&self) -> impl Iterator<Item = &str> {
            self.aliases.iter().map(String::as_str)
        }
    }

    fn catalog() -> Vec<Named> {
        vec![
            named("Attack on Titan", &["Shingeki no Kyojin"]),
            named("Cowboy Bebop", &[]),
            named("Frieren: Beyond Journey's End", &["Sousou no Frieren"]),
            named("Mushishi", &[]),
        ]
    }

    #[test]
    fn typo_matches_through_edit_distance() {
        let index = TitleSearchIndex::default();
        let title = named("Attack on Titan", &["Shingeki no Kyojin"]);
        assert!(index.matches(&title, "attak"));
        assert!(index.matches(&title, "Atack on Titan"));
    }

    #[test]
    fn alias_substring_matches() {
        let index = TitleSearchIndex::default();
        let title = named("Attack on Titan", &["Shingeki no Kyojin"]);
        assert!(index.matches(&title, "kyojin"));
        assert!(index.matches(&title, "KYOJIN"));
    }

    #[test]
    fn unrelated_query_does_not_match() {
        let index = TitleSearchIndex::default();
        let title = named("Attack on Titan", &["Shingeki no Kyojin"]);
        assert!(!index.matches(&title, "bebop"));
        assert!(!index.matches(&title, "monster"));
    }

    #[test]
    fn short_names_match_through_edit_distance() {
        let index = TitleSearchIndex::default();
        assert!(index.matches(&named("Ao", &[]), "ai"));
        assert!(index.matches(&named("Mob", &[]), "mop"));
        assert!(index.matches(&named("K", &[]), "x"));
        assert!(index.matches(&named("Cowboy Bebop", &[]), "bo"));
        assert!(!TitleSearchIndex::new(0).matches(&named("Ao", &[]), "ai"));
    }

    #[test]
    fn blank_query_matches_everything() {
        let index = TitleSearchIndex::default();
        assert!(index.matches(&named("Mushishi", &[]), "   "));
        assert_eq!(index.filter(catalog(), "").len(), 4);
    }

    #[test]
    fn threshold_is_respected() {
        let strict = TitleSearchIndex::new(0);
        let loose = TitleSearchIndex::new(3);
        let title = named("Mushishi", &[]);

        assert!(!strict.matches(&title, "mushushi"));
        assert!(strict.matches(&title, "mushi"));
        assert!(loose.matches(&title, "moshusho"));
        assert!(!TitleSearchIndex::default().matches(&title, "moshusho"));
    }

    #[test]
    fn filter_preserves_order() {
        let index = TitleSearchIndex::default();
        let result = index.filter(catalog(), "no");
        let primaries: Vec<&str> = result.iter().map(|t| t.primary.as_str()).collect();
        assert_eq!(
            primaries,
            vec!["Attack on Titan", "Frieren: Beyond Journey's End"]
        );
    }

    #[test]
    fn filter_is_idempotent() {
        let index = TitleSearchIndex::default();
        for query in ["attak", "frieren", "bebop", "no", "xyz", ""] {
            let once = index.filter(catalog(), query);
            let twice = index.filter(once.clone(), query);
            assert_eq!(once, twice, "query={query:?}");
        }
    }
}
