//! Domain types for the watch tracker with strong typing.
//!
//! Identifiers are newtypes so a `TitleId` can never be passed where a
//! `NameId` is expected.

mod names;

pub use names::{CandidateName, InvalidName};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self(id))
            }
        }
    };
}

id_newtype!(
    /// Unique identifier for a tracked title.
    ///
    /// ```rust
    /// use whatdoing::domain::TitleId;
    ///
    /// let id = TitleId::new(42);
    /// assert_eq!(id.value(), 42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    TitleId
);

id_newtype!(
    /// Unique identifier for a canonical name row.
    NameId
);

id_newtype!(
    /// Unique identifier for a registered user.
    UserId
);

id_newtype!(
    /// Unique identifier for a library entry (one user's progress on one title).
    ProgressId
);

/// Ordering of listings by primary name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Returns true if this is ascending order.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    /// Parses a user-supplied sort value. Anything unrecognized is ascending.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "desc" | "descending" => Self::Descending,
            _ => Self::Ascending,
        }
    }
}
