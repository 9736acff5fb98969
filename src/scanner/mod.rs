//! Scanner module for file discovery and metadata precomputation.
//!
//! This module provides:
//! - Parallel directory walking with hidden-entry exclusion ([`walker`])
//! - Per-file metadata records with normalized names ([`precompute`])
//!
//! # Example
//!
//! ```no_run
//! use neardupe::scanner::{list_files, precompute_records, sort_by_mtime};
//! use neardupe::progress::NullProgress;
//! use neardupe::signal::CancelToken;
//! use std::path::Path;
//!
//! let root = Path::new("/recordings");
//! let cancel = CancelToken::new();
//! let paths = sort_by_mtime(list_files(root, &NullProgress, &cancel)?);
//! let records = precompute_records(&paths, root, &NullProgress, &cancel);
//! println!("{} records", records.len());
//! # Ok::<(), neardupe::scanner::ScanError>(())
//! ```

pub mod precompute;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

pub use precompute::precompute_records;
pub use walker::{list_files, sort_by_mtime};

/// Immutable metadata for one discovered file.
///
/// Created once during precompute and never mutated afterwards. The
/// comparison engine only ever reads these through a shared slice.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Containing directory (pairs are only formed within one directory)
    pub dir_path: PathBuf,
    /// Base name, as found on disk
    pub file_name: String,
    /// Path relative to the scan root, for display
    pub rel_path: String,
    /// Base name with digits, separators, and broadcast glyphs stripped;
    /// used for similarity scoring only, never shown to the user
    pub normalized: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub mtime: SystemTime,
    /// Discovery ordinal (oldest mtime first); display/ordering only,
    /// never consulted by the comparison predicate
    pub ordinal: usize,
}

/// Characters removed when deriving the normalized name.
///
/// Digits, underscore, half/full-width space, brackets, and the broadcast
/// notation glyphs (🈑 sign-language, 🈞 rerun mark, 字 subtitle, 再 rerun,
/// 前/後 part markers) all vary freely between recordings of the same
/// program, so they carry no signal for similarity scoring.
fn is_stripped_char(c: char) -> bool {
    c.is_numeric()
        || matches!(
            c,
            '_' | ' ' | '\u{3000}' | '🈑' | '🈞' | '字' | '再' | '前' | '後' | '[' | ']'
        )
}

/// Derive the normalized form of a base name.
///
/// A single fixed character-class removal; deterministic for a given input.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars().filter(|&c| !is_stripped_char(c)).collect()
}

/// True when a character belongs to the stripped class.
///
/// Exposed for the confirmation display, which dims these characters in
/// the diff output.
#[must_use]
pub fn is_noise_char(c: char) -> bool {
    is_stripped_char(c)
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_digits_and_separators() {
        assert_eq!(normalize_name("show_2024 [HD].ts"), "showHD.ts");
    }

    #[test]
    fn test_normalize_strips_broadcast_glyphs() {
        assert_eq!(normalize_name("番組名 前編🈑"), "番組名編");
        assert_eq!(normalize_name("番組名 後編 再"), "番組名編");
    }

    #[test]
    fn test_normalize_strips_fullwidth_space_and_digits() {
        assert_eq!(normalize_name("名前　１２３"), "名前");
    }

    #[test]
    fn test_normalize_all_noise_yields_empty() {
        assert_eq!(normalize_name("123_456 []"), "");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let name = "番組名 #12_250716.ts";
        assert_eq!(normalize_name(name), normalize_name(name));
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
    }
}
