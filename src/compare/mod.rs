//! Duplicate-candidate detection engine.
//!
//! This module provides:
//! - Digit-run analysis for the episode heuristic ([`digits`])
//! - Character-level name alignment and similarity ratios ([`alignment`])
//! - The ordered filter cascade ([`filters`])
//! - The parallel comparison scheduler ([`scheduler`])
//!
//! # Example
//!
//! ```no_run
//! use neardupe::compare::{find_candidates, SchedulerConfig};
//! use neardupe::progress::NullProgress;
//! use neardupe::signal::CancelToken;
//! use std::sync::Arc;
//!
//! let records = Arc::new(Vec::new()); // from scanner::precompute_records
//! let outcome = find_candidates(
//!     records,
//!     &SchedulerConfig::default(),
//!     &NullProgress,
//!     &CancelToken::new(),
//! )?;
//! println!("{} candidates", outcome.candidates.len());
//! # Ok::<(), neardupe::compare::ScheduleError>(())
//! ```

pub mod alignment;
pub mod digits;
pub mod filters;
pub mod scheduler;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileRecord;

pub use alignment::{quick_ratio, similarity_ratio, NameAlignment};
pub use filters::{compare_records, DEFAULT_MATCH_THRESHOLD};
pub use scheduler::{
    default_workers, find_candidates, ScheduleError, SchedulerConfig, SweepOutcome,
};

/// A pair of same-directory files judged likely duplicates, awaiting user
/// confirmation.
///
/// `older.mtime <= newer.mtime` always holds; the newer file is the one
/// offered for deletion. The alignment covers the two *original* base
/// names (older side first) and backs both the disqualification
/// heuristics and the colorized diff at confirmation time.
#[derive(Debug, Clone)]
pub struct CandidatePair {
    /// The record with the smaller modification time.
    pub older: FileRecord,
    /// The record with the larger modification time; deletion target.
    pub newer: FileRecord,
    /// Alignment of `older.file_name` against `newer.file_name`.
    pub alignment: NameAlignment,
}

impl CandidatePair {
    /// Similarity ratio of the original names, for display.
    #[must_use]
    pub fn similarity(&self) -> f64 {
        self.alignment.ratio()
    }

    /// Absolute size difference in bytes.
    #[must_use]
    pub fn size_diff_bytes(&self) -> u64 {
        self.older.size.abs_diff(self.newer.size)
    }

    /// Size difference as a percentage of the larger file (0 when both
    /// files are empty).
    #[must_use]
    pub fn size_diff_percent(&self) -> f64 {
        let max_size = self.older.size.max(self.newer.size);
        if max_size == 0 {
            0.0
        } else {
            100.0 * self.size_diff_bytes() as f64 / max_size as f64
        }
    }
}

/// Count the comparisons the sweep will actually evaluate: for each
/// directory holding `k` records, `k·(k-1)/2` pairs.
///
/// Drives the comparison progress bar total.
#[must_use]
pub fn count_valid_comparisons(records: &[FileRecord]) -> u64 {
    let mut dir_counts: HashMap<&PathBuf, u64> = HashMap::new();
    for record in records {
        *dir_counts.entry(&record.dir_path).or_insert(0) += 1;
    }
    dir_counts.values().map(|&k| k * (k - 1) / 2).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn record(dir: &str, name: &str) -> FileRecord {
        let dir_path = PathBuf::from(dir);
        FileRecord {
            path: dir_path.join(name),
            dir_path,
            file_name: name.to_string(),
            rel_path: name.to_string(),
            normalized: crate::scanner::normalize_name(name),
            size: 0,
            mtime: SystemTime::UNIX_EPOCH,
            ordinal: 0,
        }
    }

    #[test]
    fn test_count_valid_comparisons_grouped_by_dir() {
        let records = vec![
            record("/a", "1.ts"),
            record("/a", "2.ts"),
            record("/a", "3.ts"),
            record("/b", "4.ts"),
            record("/b", "5.ts"),
            record("/c", "6.ts"),
        ];
        // /a: 3 pairs, /b: 1 pair, /c: 0
        assert_eq!(count_valid_comparisons(&records), 4);
    }

    #[test]
    fn test_count_valid_comparisons_empty() {
        assert_eq!(count_valid_comparisons(&[]), 0);
    }

    #[test]
    fn test_size_diff_percent_zero_sizes() {
        let a = record("/a", "x.ts");
        let b = record("/a", "y.ts");
        let pair = CandidatePair {
            alignment: NameAlignment::new(&a.file_name, &b.file_name),
            older: a,
            newer: b,
        };
        assert_eq!(pair.size_diff_percent(), 0.0);
        assert_eq!(pair.size_diff_bytes(), 0);
    }
}
