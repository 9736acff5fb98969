//! Per-directory candidate statistics (`--stats`).
//!
//! A diagnostic mode that answers "where would the questions come from?"
//! without asking any: records are grouped by directory, the filter
//! cascade runs sequentially per group, and a table of directories with
//! at least one candidate is printed, busiest first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use yansi::Paint;

use crate::compare::{compare_records, count_valid_comparisons};
use crate::scanner::FileRecord;
use crate::signal::CancelToken;

/// Candidate counts for one directory.
#[derive(Debug, Clone)]
pub struct DirStats {
    /// Directory path relative to the scan root.
    pub rel_path: String,
    /// Records in the directory.
    pub file_count: usize,
    /// Pairs the cascade evaluated.
    pub pairs: u64,
    /// Pairs that survived every filter.
    pub candidates: usize,
}

/// Group records per directory and count cascade survivors.
///
/// Directories are processed largest first so the slow ones show progress
/// early; only directories with at least one candidate are returned,
/// sorted by candidate count descending.
#[must_use]
pub fn collect_dir_stats(
    records: &[FileRecord],
    threshold: f64,
    root: &Path,
    cancel: &CancelToken,
) -> Vec<DirStats> {
    let mut by_dir: HashMap<&PathBuf, Vec<&FileRecord>> = HashMap::new();
    for record in records {
        by_dir.entry(&record.dir_path).or_default().push(record);
    }

    let mut dirs: Vec<_> = by_dir.into_iter().collect();
    dirs.sort_by_key(|(_, infos)| std::cmp::Reverse(infos.len()));

    let mut results = Vec::new();

    for (processed, (dir, infos)) in dirs.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        if infos.len() < 2 {
            continue;
        }

        let rel_path = dir
            .strip_prefix(root)
            .unwrap_or(dir)
            .to_string_lossy()
            .into_owned();
        let display = if rel_path.is_empty() { "." } else { &rel_path };

        print!(
            "  [{}/{}] {} ({} files)...",
            processed + 1,
            dirs.len(),
            display,
            infos.len()
        );

        let mut candidates = 0;
        let mut pairs = 0u64;
        for i in 0..infos.len() {
            for j in i + 1..infos.len() {
                pairs += 1;
                if compare_records(infos[i], infos[j], threshold).is_some() {
                    candidates += 1;
                }
            }
        }
        println!(" {} candidates", candidates);

        if candidates > 0 {
            results.push(DirStats {
                rel_path: display.to_string(),
                file_count: infos.len(),
                pairs,
                candidates,
            });
        }
    }

    results.sort_by_key(|s| std::cmp::Reverse(s.candidates));
    results
}

/// Print the stats table with a totals row.
pub fn print_stats_table(stats: &[DirStats], records: &[FileRecord]) {
    println!();
    println!("{}", "=".repeat(80));
    println!(
        "{:<44} {:>10} {:>10} {:>12}",
        "directory", "files", "pairs", "candidates"
    );
    println!("{}", "=".repeat(80));

    let mut total_candidates = 0;
    for entry in stats {
        total_candidates += entry.candidates;
        let mut display_path = entry.rel_path.clone();
        if display_path.chars().count() > 41 {
            let tail: String = display_path
                .chars()
                .rev()
                .take(41)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            display_path = format!("...{tail}");
        }
        println!(
            "{:<44} {:>10} {:>10} {:>12}",
            display_path, entry.file_count, entry.pairs, entry.candidates
        );
    }

    println!("{}", "=".repeat(80));
    println!(
        "{:<44} {:>10} {:>10} {:>12}",
        "total",
        records.len(),
        count_valid_comparisons(records),
        total_candidates.to_string().green()
    );
}
