use std::fmt;
use thiserror::Error;

/// Longest name accepted, in chars.
const MAX_NAME_CHARS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidName {
    #[error("name cannot be blank")]
    Blank,

    #[error("name exceeds {MAX_NAME_CHARS} characters")]
    TooLong,
}

/// A name as submitted by a caller, normalized for storage and comparison.
///
/// The display form is trimmed with inner whitespace runs collapsed to a
/// single space. The key is the lower-cased display form; two candidates with
/// the same key denote the same canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateName {
    display: String,
    key: String,
}

impl CandidateName {
    /// ```rust
    /// use whatdoing::domain::CandidateName;
    ///
    /// let a = CandidateName::parse("Cowboy Bebop").unwrap();
    /// let b = CandidateName::parse("  cowboy   BEBOP ").unwrap();
    /// assert_eq!(a.key(), b.key());
    /// assert_eq!(b.display(), "cowboy BEBOP");
    /// ```
    pub fn parse(text: &str) -> Result<Self, InvalidName> {
        let display = text.split_whitespace().collect::<Vec<_>>().join(" ");

        if display.is_empty() {
            return Err(InvalidName::Blank);
        }
        if display.chars().count() > MAX_NAME_CHARS {
            return Err(InvalidName::TooLong);
        }

        let key = display.to_lowercase();
        Ok(Self { display, key })
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}
