//! The heuristic filter cascade.
//!
//! Given two records from the same directory, [`compare_records`] decides
//! "same underlying file, different name" vs "not a match" by running a
//! chain of filters ordered cheapest first, short-circuiting on the first
//! one that disqualifies the pair:
//!
//! 1. length-ratio prefilter on the normalized names
//! 2. multiset quick-ratio bound (can only reject what the exact ratio
//!    would reject)
//! 3. exact alignment ratio on the normalized names
//! 4. broadcast part-marker exclusion (前 vs 後) on the original names
//! 5. episode-number exclusion (short digit-run differences) on the
//!    original names
//! 6. size-difference filter
//!
//! Survivors become [`CandidatePair`]s carrying the original-name
//! alignment for the confirmation display.

use similar::DiffTag;

use super::alignment::{quick_ratio, NameAlignment};
use super::digits::{expand_to_digit_group, find_digit_group_in_range, is_digit};
use super::CandidatePair;
use crate::scanner::FileRecord;

/// Default similarity threshold: pairs scoring at or below this are not
/// candidates.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

/// Normalized-name length ratio below which a pair is rejected outright.
const MIN_LENGTH_RATIO: f64 = 0.5;

/// Size difference (percent of the larger file) above which a pair is
/// rejected.
const MAX_SIZE_DIFF_PERCENT: f64 = 40.0;

/// Maximum digit-run length still read as an episode/part number.
const EPISODE_DIGITS_MAX: usize = 2;

/// Evaluate the filter cascade for two records in the same directory.
///
/// Returns the candidate pair with the older record first when every
/// filter passes, `None` otherwise. Symmetric in its arguments up to the
/// older/newer labeling; equal mtimes label `a` as older.
#[must_use]
pub fn compare_records(a: &FileRecord, b: &FileRecord, threshold: f64) -> Option<CandidatePair> {
    // 1. length-ratio prefilter (skipped when either side is empty; two
    //    all-noise names still get compared by size and mtime alone)
    let len1 = a.normalized.chars().count();
    let len2 = b.normalized.chars().count();
    if len1 > 0 && len2 > 0 {
        let length_ratio = len1.min(len2) as f64 / len1.max(len2) as f64;
        if length_ratio < MIN_LENGTH_RATIO {
            return None;
        }
    }

    // 2. multiset bound, 3. exact ratio
    if quick_ratio(&a.normalized, &b.normalized) <= threshold {
        return None;
    }
    let judge = NameAlignment::new(&a.normalized, &b.normalized);
    if judge.ratio() <= threshold {
        return None;
    }

    // older/newer labeling before the original-name heuristics so their
    // alignment is the one the confirmation display reuses
    let (older, newer) = if a.mtime <= b.mtime { (a, b) } else { (b, a) };
    let alignment = NameAlignment::new(&older.file_name, &newer.file_name);

    // 4. part-marker, 5. episode-number
    if has_part_marker_diff(&alignment) {
        return None;
    }
    if has_episode_number_diff(&alignment) {
        return None;
    }

    // 6. size difference
    let max_size = a.size.max(b.size);
    if max_size > 0 {
        let size_diff_percent = 100.0 * a.size.abs_diff(b.size) as f64 / max_size as f64;
        if size_diff_percent > MAX_SIZE_DIFF_PERCENT {
            return None;
        }
    }

    Some(CandidatePair {
        older: older.clone(),
        newer: newer.clone(),
        alignment,
    })
}

/// Glyph marking the first part of a multi-part broadcast.
const PART_PRIOR: char = '前';
/// Glyph marking the second part of a multi-part broadcast.
const PART_LATTER: char = '後';

/// True when some replace segment swaps the prior-part marker for the
/// latter-part marker (either direction).
///
/// 「前編」 vs 「後編」 name genuinely different halves of one broadcast,
/// never cosmetic variants, no matter how similar the rest of the name is.
fn has_part_marker_diff(alignment: &NameAlignment) -> bool {
    for op in alignment.ops() {
        if op.tag() != DiffTag::Replace {
            continue;
        }
        let s1 = &alignment.old_chars()[op.old_range()];
        let s2 = &alignment.new_chars()[op.new_range()];
        if (s1.contains(&PART_PRIOR) && s2.contains(&PART_LATTER))
            || (s1.contains(&PART_LATTER) && s2.contains(&PART_PRIOR))
        {
            return true;
        }
    }
    false
}

/// True when the names differ by a short digit run: an episode or part
/// number (`#1` vs `#2`, `第10話` vs `第11話`), not a cosmetic rename.
///
/// Each differing segment that touches a digit is widened to the maximal
/// contiguous digit run on both sides; only when both runs are at most
/// [`EPISODE_DIGITS_MAX`] digits does the segment count as an episode
/// difference. Longer runs (date stamps, timestamps) pass through.
fn has_episode_number_diff(alignment: &NameAlignment) -> bool {
    let old = alignment.old_chars();
    let new = alignment.new_chars();

    for op in alignment.ops() {
        let r1 = op.old_range();
        let r2 = op.new_range();
        match op.tag() {
            DiffTag::Replace => {
                if !old[r1.clone()].iter().copied().any(is_digit) {
                    continue;
                }
                if !new[r2.clone()].iter().copied().any(is_digit) {
                    continue;
                }
                let Some(g1) = find_digit_group_in_range(old, r1.start, r1.end) else {
                    continue;
                };
                let Some(g2) = find_digit_group_in_range(new, r2.start, r2.end) else {
                    continue;
                };
                if g1.len() <= EPISODE_DIGITS_MAX && g2.len() <= EPISODE_DIGITS_MAX {
                    return true;
                }
            }
            DiffTag::Delete => {
                // digits present only on the old side, e.g. #11 -> #1
                if !old[r1.clone()].iter().copied().any(is_digit) {
                    continue;
                }
                let Some(g1) = find_digit_group_in_range(old, r1.start, r1.end) else {
                    continue;
                };
                let g2 = expand_to_digit_group(new, r2.start, r2.start);
                let s2 = &new[g2.clone()];
                if (s2.is_empty() || s2.iter().copied().all(is_digit))
                    && g1.len() <= EPISODE_DIGITS_MAX
                    && g2.len() <= EPISODE_DIGITS_MAX
                {
                    return true;
                }
            }
            DiffTag::Insert => {
                // digits present only on the new side, e.g. #1 -> #11
                if !new[r2.clone()].iter().copied().any(is_digit) {
                    continue;
                }
                let Some(g2) = find_digit_group_in_range(new, r2.start, r2.end) else {
                    continue;
                };
                let g1 = expand_to_digit_group(old, r1.start, r1.start);
                let s1 = &old[g1.clone()];
                if (s1.is_empty() || s1.iter().copied().all(is_digit))
                    && g1.len() <= EPISODE_DIGITS_MAX
                    && g2.len() <= EPISODE_DIGITS_MAX
                {
                    return true;
                }
            }
            DiffTag::Equal => {}
        }
    }
    false
}
