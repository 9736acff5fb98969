//! Character-level name alignment.
//!
//! Wraps the `similar` crate's opcode diff into a [`NameAlignment`] that
//! the filter cascade and the confirmation display both consume. The
//! similarity ratio is the classic `2*M / T` where `M` is the number of
//! matching characters and `T` the combined length; [`quick_ratio`] is a
//! character-multiset upper bound of that ratio, cheap enough to run
//! before the full alignment.

use std::collections::HashMap;

use similar::{capture_diff_slices, Algorithm, DiffOp};

/// An alignment between two names, computed once and reused for the
/// similarity ratio, the disqualification heuristics, and diff coloring.
#[derive(Debug, Clone)]
pub struct NameAlignment {
    old: Vec<char>,
    new: Vec<char>,
    ops: Vec<DiffOp>,
}

impl NameAlignment {
    /// Align two strings character-by-character.
    #[must_use]
    pub fn new(old: &str, new: &str) -> Self {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();
        let ops = capture_diff_slices(Algorithm::Myers, &old, &new);
        Self { old, new, ops }
    }

    /// The opcode sequence covering both strings in order.
    #[must_use]
    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// The first string as characters.
    #[must_use]
    pub fn old_chars(&self) -> &[char] {
        &self.old
    }

    /// The second string as characters.
    #[must_use]
    pub fn new_chars(&self) -> &[char] {
        &self.new
    }

    /// Similarity ratio in `[0, 1]`: `2*M / T` over matching characters.
    ///
    /// Two empty strings are a perfect match (ratio 1.0).
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let total = self.old.len() + self.new.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self
            .ops
            .iter()
            .map(|op| match op {
                DiffOp::Equal { len, .. } => *len,
                _ => 0,
            })
            .sum();
        2.0 * matches as f64 / total as f64
    }
}

/// Exact similarity ratio between two strings.
///
/// Convenience for callers that do not need the opcode stream.
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    NameAlignment::new(a, b).ratio()
}

/// Cheap upper bound on [`similarity_ratio`].
///
/// Counts characters common to both strings regardless of position:
/// `2 * sum(min(count_a(c), count_b(c))) / T`. Alignment can only lose
/// matches relative to the multiset intersection, so
/// `quick_ratio(a, b) >= similarity_ratio(a, b)` always holds, making
/// this a sound pre-filter: anything rejected here would also be
/// rejected by the exact ratio.
#[must_use]
pub fn quick_ratio(a: &str, b: &str) -> f64 {
    let mut counts: HashMap<char, isize> = HashMap::new();
    let mut total = 0usize;
    for c in a.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    let mut matches = 0usize;
    for c in b.chars() {
        let count = counts.entry(c).or_insert(0);
        if *count > 0 {
            matches += 1;
        }
        *count -= 1;
        total += 1;
    }
    if total == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / total as f64
}
