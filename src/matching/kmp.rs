//! Knuth-Morris-Pratt substring search.

/// Builds the longest-proper-prefix-that-is-also-a-suffix table for `needle`.
///
/// `table[i]` is the length of the longest proper prefix of `needle[..=i]`
/// that is also a suffix of it.
fn failure_table(needle: &[char]) -> Vec<usize> {
    let mut table = vec![0; needle.len()];
    let mut len = 0;
    let mut i = 1;

    while i < needle.len() {
        if needle[i] == needle[len] {
            len += 1;
            table[i] = len;
            i += 1;
        } else if len > 0 {
            len = table[len - 1];
        } else {
            table[i] = 0;
            i += 1;
        }
    }

    table
}

/// Returns the char index of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at index 0. Indices count chars, not bytes.
///
/// ```rust
/// use whatdoing::matching::find;
///
/// assert_eq!(find("shingeki no kyojin", "kyojin"), Some(12));
/// assert_eq!(find("frieren", "fern"), None);
/// ```
#[must_use]
pub fn find(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return Some(0);
    }

    let haystack: Vec<char> = haystack.chars().collect();
    if needle.len() > haystack.len() {
        return None;
    }

    let table = failure_table(&needle);
    let mut matched = 0;

    for (i, &c) in haystack.iter().enumerate() {
        while matched > 0 && c != needle[matched] {
            matched = table[matched - 1];
        }

        if c == needle[matched] {
            matched += 1;
        }

        if matched == needle.len() {
            return Some(i + 1 - matched);
        }
    }

    None
}
