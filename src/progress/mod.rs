//! Derived watch status for library entries and the options used to query them.
//!
//! Status is never stored. It follows from the entry's episode counter and
//! the title's total episode count:
//!
//! | counter                | total known     | status        |
//! |------------------------|-----------------|---------------|
//! | `0`                    | any             | `not-started` |
//! | `0 < episode < total`  | yes             | `started`     |
//! | `episode >= total`     | yes             | `completed`   |
//! | `> 0`                  | no              | `started`     |

mod options;

pub use options::{Lookup, QueryOptions, QueryPlan};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    NotStarted,
    Started,
    Completed,
}

impl ProgressStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }

    /// Parses a status name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "not-started" | "not_started" => Some(Self::NotStarted),
            "started" => Some(Self::Started),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an entry. With an unknown total an entry never completes.
#[must_use]
pub const fn derive_status(episode: i32, total: Option<i32>) -> ProgressStatus {
    if episode <= 0 {
        return ProgressStatus::NotStarted;
    }

    match total {
        Some(total) if episode >= total => ProgressStatus::Completed,
        _ => ProgressStatus::Started,
    }
}

/// Whether the counter may move from `current` to `next`.
///
/// The counter never decreases and never passes a known total.
#[must_use]
pub fn is_valid_episode_update(current: i32, next: i32, total: Option<i32>) -> bool {
    next >= 0 && next >= current && total.is_none_or(|total| next <= total)
}

/// Counter value that puts an entry into `target`, if reachable without
/// decreasing the counter.
#[must_use]
pub fn episode_for_status(target: ProgressStatus, current: i32, total: Option<i32>) -> Option<i32> {
    let next = match target {
        ProgressStatus::NotStarted => 0,
        ProgressStatus::Started => current.max(1),
        ProgressStatus::Completed => total?,
    };

    (is_valid_episode_update(current, next, total) && derive_status(next, total) == target)
        .then_some(next)
}
