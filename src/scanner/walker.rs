//! Directory walking and mtime ordering.
//!
//! Discovery collects regular files under the scan root, excluding hidden
//! files and hidden directories, with one progress tick per file found.
//! Uses [`jwalk`] for parallel traversal; children are sorted by name so
//! two runs over an unchanged tree list files in the same order.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use jwalk::WalkDir;

use super::ScanError;
use crate::progress::{ProgressCallback, PHASE_LISTING};
use crate::signal::CancelToken;

/// Collect all regular files under `root`.
///
/// Hidden files and hidden directories (names starting with `.`) are
/// excluded during traversal. Unreadable entries are logged and skipped;
/// only a missing or non-directory root is an error. Cancellation stops
/// iteration early and returns the paths gathered so far.
pub fn list_files(
    root: &Path,
    progress: &dyn ProgressCallback,
    cancel: &CancelToken,
) -> Result<Vec<PathBuf>, ScanError> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
        _ => ScanError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut paths = Vec::new();

    let walk = WalkDir::new(root).skip_hidden(true).sort(true);
    for entry_result in walk {
        if cancel.is_cancelled() {
            log::debug!("Walker: cancellation requested, stopping iteration");
            break;
        }

        match entry_result {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                paths.push(entry.path());
                progress.on_tick(PHASE_LISTING, 1);
            }
            Err(e) => {
                log::warn!("Walker: skipping unreadable entry: {}", e);
            }
        }
    }

    log::debug!("Walker: {} files under {}", paths.len(), root.display());
    Ok(paths)
}

/// Sort a path list by modification time, oldest first.
///
/// Paths whose metadata cannot be read sort to the front (epoch mtime)
/// rather than aborting; they are dropped later during precompute anyway.
/// Ties break on the path itself so the order is stable across runs.
#[must_use]
pub fn sort_by_mtime(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by_cached_key(|p| (mtime_or_epoch(p), p.clone()));
    paths
}

fn mtime_or_epoch(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
