//! Exact and approximate string matching used by title search.
//!
//! Both functions compare chars as given. Case folding is up to the caller
//! and must be applied to both operands.

mod kmp;
mod levenshtein;

pub use kmp::find;
pub use levenshtein::{edit_distance, within_distance};
