//! Levenshtein edit distance.

/// Minimum number of single-char insertions, deletions or substitutions
/// turning `a` into `b`.
///
/// Uses the full suffix-oriented table: `table[i][j]` is the distance between
/// `a[i..]` and `b[j..]`, so the answer ends up in `table[0][0]`.
///
/// ```rust
/// use whatdoing::matching::edit_distance;
///
/// assert_eq!(edit_distance("attak", "attack"), 1);
/// assert_eq!(edit_distance("", "bebop"), 5);
/// ```
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (rows, cols) = (a.len(), b.len());

    let mut table = vec![vec![0usize; cols + 1]; rows + 1];

    for (j, cell) in table[rows].iter_mut().enumerate() {
        *cell = cols - j;
    }
    for (i, row) in table.iter_mut().enumerate() {
        row[cols] = rows - i;
    }

    for i in (0..rows).rev() {
        for j in (0..cols).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1]
            } else {
                1 + table[i + 1][j].min(table[i][j + 1]).min(table[i + 1][j + 1])
            };
        }
    }

    table[0][0]
}

/// Whether `edit_distance(a, b) <= max`.
///
/// Rejects on length difference alone before filling the table, since the
/// distance can never be smaller than it.
#[must_use]
pub fn within_distance(a: &str, b: &str, max: usize) -> bool {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a.abs_diff(len_b) > max {
        return false;
    }

    edit_distance(a, b) <= max
}
