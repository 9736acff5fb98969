//! Metadata precomputation.
//!
//! Turns the sorted path list into [`FileRecord`]s. Each record carries
//! everything the comparison predicate needs so the pairwise sweep never
//! touches the filesystem.

use std::path::{Path, PathBuf};

use super::{normalize_name, FileRecord};
use crate::progress::{ProgressCallback, PHASE_PRECOMPUTE};
use crate::signal::CancelToken;

/// Build a [`FileRecord`] for every path whose metadata can be read.
///
/// Paths that fail to stat (permission error, vanished file) are dropped
/// from the working set; the progress tick still fires once per attempted
/// path so the bar reaches its total. The ordinal stored in each record is
/// the position in `paths`, which the caller has already sorted oldest
/// modification time first.
#[must_use]
pub fn precompute_records(
    paths: &[PathBuf],
    root: &Path,
    progress: &dyn ProgressCallback,
    cancel: &CancelToken,
) -> Vec<FileRecord> {
    let mut records = Vec::with_capacity(paths.len());

    for (ordinal, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            log::debug!("Precompute: cancellation requested after {} records", records.len());
            break;
        }

        match build_record(path, root, ordinal) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Precompute: skipping {}: {}", path.display(), e);
            }
        }
        progress.on_tick(PHASE_PRECOMPUTE, 1);
    }

    records
}

fn build_record(path: &Path, root: &Path, ordinal: usize) -> std::io::Result<FileRecord> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir_path = path.parent().unwrap_or(path).to_path_buf();
    let rel_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned();

    Ok(FileRecord {
        path: path.to_path_buf(),
        dir_path,
        normalized: normalize_name(&file_name),
        file_name,
        rel_path,
        size: metadata.len(),
        mtime,
        ordinal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_precompute_builds_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("番組名 #12.ts");
        File::create(&path).unwrap().write_all(b"data").unwrap();

        let records =
            precompute_records(&[path.clone()], dir.path(), &NullProgress, &CancelToken::new());

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.path, path);
        assert_eq!(record.dir_path, dir.path());
        assert_eq!(record.file_name, "番組名 #12.ts");
        assert_eq!(record.rel_path, "番組名 #12.ts");
        assert_eq!(record.normalized, "番組名#.ts");
        assert_eq!(record.size, 4);
        assert_eq!(record.ordinal, 0);
    }

    #[test]
    fn test_precompute_skips_vanished_files() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.ts");
        File::create(&real).unwrap();
        let ghost = dir.path().join("ghost.ts");

        let records = precompute_records(
            &[ghost, real.clone()],
            dir.path(),
            &NullProgress,
            &CancelToken::new(),
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, real);
        // ordinal reflects the attempted position, not the surviving count
        assert_eq!(records[0].ordinal, 1);
    }

    #[test]
    fn test_precompute_cancelled_returns_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ts");
        File::create(&path).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let records = precompute_records(&[path], dir.path(), &NullProgress, &cancel);
        assert!(records.is_empty());
    }
}
