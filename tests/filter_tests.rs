//! Filter-cascade behavior at its documented boundaries.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use neardupe::compare::{
    compare_records, quick_ratio, similarity_ratio, DEFAULT_MATCH_THRESHOLD,
};
use neardupe::scanner::{normalize_name, FileRecord};
use proptest::prelude::*;

fn record_in(dir: &str, name: &str, size: u64, mtime_secs: u64, ordinal: usize) -> FileRecord {
    let dir_path = PathBuf::from(dir);
    FileRecord {
        path: dir_path.join(name),
        dir_path,
        file_name: name.to_string(),
        rel_path: name.to_string(),
        normalized: normalize_name(name),
        size,
        mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs),
        ordinal,
    }
}

fn record(name: &str, size: u64, mtime_secs: u64) -> FileRecord {
    record_in("/recordings", name, size, mtime_secs, mtime_secs as usize)
}

#[test]
fn test_episode_number_difference_is_rejected() {
    let a = record("番組名 #1_200101.ts", 1_000_000, 100);
    let b = record("番組名 #2_200101.ts", 1_000_000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_none());
}

#[test]
fn test_date_stamp_difference_is_not_an_episode() {
    let a = record("番組名_250716_2130.ts", 1_000_000, 100);
    let b = record("番組名_250723_1215.ts", 1_000_000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_some());
}

#[test]
fn test_three_digit_run_is_not_an_episode() {
    let a = record("番組名_100_内容.ts", 1_000_000, 100);
    let b = record("番組名_101_内容.ts", 1_000_000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_some());
}

#[test]
fn test_part_markers_always_reject() {
    // similarity of the normalized names is 100% here; the marker rule
    // still wins
    let a = record("番組名 前編", 1_000_000, 100);
    let b = record("番組名 後編", 1_000_000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_none());
    assert!(compare_records(&b, &a, DEFAULT_MATCH_THRESHOLD).is_none());
}

#[test]
fn test_size_boundary_forty_percent_passes() {
    let a = record("映画_250716_2130.ts", 100_000_000, 100);
    let b = record("映画_250716_2135.ts", 60_000_000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_some());
}

#[test]
fn test_size_beyond_forty_percent_rejects() {
    let a = record("映画_250716_2130.ts", 100_000_000, 100);
    let b = record("映画_250716_2135.ts", 59_900_000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_none());
}

#[test]
fn test_length_ratio_below_half_rejects() {
    // normalized lengths 4 and 9 (identical prefix so only the length
    // prefilter can reject this early)
    let a = record("abcd", 1000, 100);
    let b = record("abcdefghi", 1000, 200);
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_none());
}

#[test]
fn test_accepted_pair_orders_older_first() {
    let a = record("番組名_250716_2130.ts", 1_000_000, 500);
    let b = record("番組名_250716_2131.ts", 1_000_000, 100);
    let pair = compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).unwrap();
    assert_eq!(pair.older.file_name, "番組名_250716_2131.ts");
    assert!(pair.older.mtime <= pair.newer.mtime);
}

#[test]
fn test_cross_directory_records_never_compared_by_engine() {
    // compare_records itself is directory-agnostic; the scheduler is the
    // component enforcing the same-directory rule (covered in scan_tests)
    let a = record_in("/a", "同じ名前_250716.ts", 1000, 100, 0);
    let b = record_in("/b", "同じ名前_250716.ts", 1000, 200, 1);
    // identical names would pass the cascade; the guard lives upstream
    assert!(compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD).is_some());
}

proptest! {
    /// The multiset estimate never under-bounds the exact ratio, which is
    /// what makes rejecting on it sound.
    #[test]
    fn prop_quick_ratio_is_upper_bound(
        a in "[a-z0-9_ あ-ん]{0,24}",
        b in "[a-z0-9_ あ-ん]{0,24}",
    ) {
        prop_assert!(quick_ratio(&a, &b) >= similarity_ratio(&a, &b) - 1e-12);
    }

    /// Candidate-ness is symmetric: swapping the arguments changes at most
    /// the older/newer labeling, never the verdict.
    #[test]
    fn prop_compare_is_symmetric(
        name_a in "[a-z0-9_ ]{1,20}",
        name_b in "[a-z0-9_ ]{1,20}",
        size_a in 0u64..10_000,
        size_b in 0u64..10_000,
    ) {
        let a = record(&name_a, size_a, 100);
        let b = record(&name_b, size_b, 200);
        let forward = compare_records(&a, &b, DEFAULT_MATCH_THRESHOLD);
        let backward = compare_records(&b, &a, DEFAULT_MATCH_THRESHOLD);
        prop_assert_eq!(forward.is_some(), backward.is_some());
        if let (Some(f), Some(r)) = (forward, backward) {
            prop_assert_eq!(&f.older.path, &r.older.path);
            prop_assert_eq!(&f.newer.path, &r.newer.path);
        }
    }
}
