//! End-to-end pipeline tests: discovery → precompute → parallel sweep.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use filetime::{set_file_mtime, FileTime};
use neardupe::compare::{count_valid_comparisons, find_candidates, SchedulerConfig};
use neardupe::progress::NullProgress;
use neardupe::scanner::{list_files, precompute_records, sort_by_mtime};
use neardupe::signal::CancelToken;
use tempfile::tempdir;

fn write_file(path: &Path, bytes: usize, mtime_unix: i64) {
    File::create(path)
        .unwrap()
        .write_all(&vec![0u8; bytes])
        .unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime_unix, 0)).unwrap();
}

fn sweep(root: &Path) -> neardupe::compare::SweepOutcome {
    let cancel = CancelToken::new();
    let paths = sort_by_mtime(list_files(root, &NullProgress, &cancel).unwrap());
    let records = precompute_records(&paths, root, &NullProgress, &cancel);
    find_candidates(
        Arc::new(records),
        &SchedulerConfig::default(),
        &NullProgress,
        &cancel,
    )
    .unwrap()
}

#[test]
fn test_near_identical_names_yield_one_pair_with_older_first() {
    let dir = tempdir().unwrap();
    let older = dir.path().join("番組名_250716_2130.ts");
    let newer = dir.path().join("番組名_250716_2135.ts");
    write_file(&older, 1_000, 1_000);
    write_file(&newer, 1_050, 2_000);

    let outcome = sweep(dir.path());

    assert_eq!(outcome.candidates.len(), 1);
    assert_eq!(outcome.valid_comparisons, 1);
    let pair = &outcome.candidates[0];
    assert_eq!(pair.older.path, older);
    assert_eq!(pair.newer.path, newer);
    assert!(pair.older.mtime <= pair.newer.mtime);
    assert!(!outcome.interrupted);
}

#[test]
fn test_identical_names_across_subdirectories_never_pair() {
    let dir = tempdir().unwrap();
    let sub_a = dir.path().join("a");
    let sub_b = dir.path().join("b");
    fs::create_dir(&sub_a).unwrap();
    fs::create_dir(&sub_b).unwrap();
    write_file(&sub_a.join("同じ名前_250716.ts"), 1_000, 1_000);
    write_file(&sub_b.join("同じ名前_250716.ts"), 1_000, 2_000);

    let outcome = sweep(dir.path());

    assert!(outcome.candidates.is_empty());
    assert_eq!(outcome.valid_comparisons, 0);
}

#[test]
fn test_episode_variants_in_one_directory_are_not_candidates() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("番組名 #1_200101.ts"), 1_000, 1_000);
    write_file(&dir.path().join("番組名 #2_200101.ts"), 1_000, 2_000);

    let outcome = sweep(dir.path());

    assert!(outcome.candidates.is_empty());
    // the pair was still a valid comparison, just filtered out
    assert_eq!(outcome.valid_comparisons, 1);
}

#[test]
fn test_hidden_files_are_invisible_to_the_sweep() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("show_250716_2130.ts"), 1_000, 1_000);
    write_file(&dir.path().join(".show_250716_2135.ts"), 1_000, 2_000);

    let cancel = CancelToken::new();
    let paths = list_files(dir.path(), &NullProgress, &cancel).unwrap();
    assert_eq!(paths.len(), 1);
}

#[test]
fn test_records_are_ordered_oldest_first() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("newest.ts"), 10, 3_000);
    write_file(&dir.path().join("oldest.ts"), 10, 1_000);
    write_file(&dir.path().join("middle.ts"), 10, 2_000);

    let cancel = CancelToken::new();
    let paths = sort_by_mtime(list_files(dir.path(), &NullProgress, &cancel).unwrap());
    let records = precompute_records(&paths, dir.path(), &NullProgress, &cancel);

    let names: Vec<_> = records.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, ["oldest.ts", "middle.ts", "newest.ts"]);
    let ordinals: Vec<_> = records.iter().map(|r| r.ordinal).collect();
    assert_eq!(ordinals, [0, 1, 2]);
}

#[test]
fn test_comparison_totals_match_prediction() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        // names distinct enough that no pair survives, sizes identical
        write_file(
            &dir.path().join(format!("program-{i}-entirely-unique-title-{i}.ts")),
            100,
            1_000 + i,
        );
    }

    let cancel = CancelToken::new();
    let paths = sort_by_mtime(list_files(dir.path(), &NullProgress, &cancel).unwrap());
    let records = precompute_records(&paths, dir.path(), &NullProgress, &cancel);
    let predicted = count_valid_comparisons(&records);

    let outcome = find_candidates(
        Arc::new(records),
        &SchedulerConfig::default(),
        &NullProgress,
        &cancel,
    )
    .unwrap();

    assert_eq!(predicted, 10);
    assert_eq!(outcome.valid_comparisons, predicted);
}

#[test]
fn test_cancellation_reports_interrupted_not_empty_success() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("show_250716_2130.ts"), 1_000, 1_000);
    write_file(&dir.path().join("show_250716_2135.ts"), 1_000, 2_000);

    let cancel = CancelToken::new();
    let paths = sort_by_mtime(list_files(dir.path(), &NullProgress, &cancel).unwrap());
    let records = precompute_records(&paths, dir.path(), &NullProgress, &cancel);

    cancel.cancel();
    let outcome = find_candidates(
        Arc::new(records),
        &SchedulerConfig::default(),
        &NullProgress,
        &cancel,
    )
    .unwrap();

    assert!(outcome.interrupted);
}
