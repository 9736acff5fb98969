//! Persistent skip cache.
//!
//! Remembers, across runs, which file-path pairs the user has explicitly
//! judged "not duplicates" so the same question is never asked twice. The
//! store is a single SQLite table keyed by the pair of absolute paths in
//! lexicographic order, which makes membership order-independent: caching
//! `(A, B)` answers queries for `(B, A)` too.
//!
//! Only the single coordinating thread ever touches the cache; comparison
//! workers never do, so no locking discipline is needed here.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

/// Errors from skip-cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache directory could not be created.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No platform cache directory could be determined.
    #[error("Failed to determine a cache directory for this platform")]
    NoCacheDir,

    /// An underlying SQLite error.
    #[error("Skip cache error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable store of user-rejected pairs.
pub struct SkipCache {
    conn: Connection,
}

impl SkipCache {
    /// Open (or create) the cache database at `path`.
    ///
    /// Parent directories are created as needed and the schema is applied
    /// idempotently.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Open an in-memory cache, for tests and `--no-cache` sessions that
    /// still want the filtering code path.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Default platform-specific cache database path.
    pub fn default_path() -> Result<PathBuf, CacheError> {
        let dirs = directories::ProjectDirs::from("io", "neardupe", "neardupe")
            .ok_or(CacheError::NoCacheDir)?;
        Ok(dirs.cache_dir().join("skipped_pairs.db"))
    }

    fn init_schema(&self) -> Result<(), CacheError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS skipped_pairs (
                path_a TEXT NOT NULL,
                path_b TEXT NOT NULL,
                skipped_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (path_a, path_b)
            );",
        )?;
        Ok(())
    }

    /// Check whether a pair was previously marked "not duplicates".
    ///
    /// Argument order does not matter.
    pub fn contains(&self, a: &Path, b: &Path) -> Result<bool, CacheError> {
        let (key_a, key_b) = pair_key(a, b);
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM skipped_pairs WHERE path_a = ?1 AND path_b = ?2")?;
        let found = stmt.exists(params![key_a, key_b])?;
        Ok(found)
    }

    /// Insert or refresh a single pair.
    ///
    /// Re-inserting an existing pair overwrites its timestamp; the row
    /// count never grows for a known pair.
    pub fn insert(&self, a: &Path, b: &Path) -> Result<(), CacheError> {
        let (key_a, key_b) = pair_key(a, b);
        self.conn.execute(
            "INSERT OR REPLACE INTO skipped_pairs (path_a, path_b) VALUES (?1, ?2)",
            params![key_a, key_b],
        )?;
        Ok(())
    }

    /// Insert or refresh many pairs in one transaction.
    ///
    /// Used at end of session to commit all rejections at once. Returns
    /// the number of pairs written.
    pub fn insert_many(&mut self, pairs: &[(PathBuf, PathBuf)]) -> Result<usize, CacheError> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO skipped_pairs (path_a, path_b) VALUES (?1, ?2)",
            )?;
            for (a, b) in pairs {
                let (key_a, key_b) = pair_key(a, b);
                stmt.execute(params![key_a, key_b])?;
            }
        }
        tx.commit()?;
        Ok(pairs.len())
    }

    /// Number of cached pairs.
    pub fn count(&self) -> Result<u64, CacheError> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM skipped_pairs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Remove every cached pair.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.conn.execute("DELETE FROM skipped_pairs", [])?;
        Ok(())
    }
}

/// Canonical `(lesser, greater)` key for an unordered path pair.
///
/// Paths are made absolute (without touching the filesystem, so vanished
/// files still key consistently) and compared as strings.
fn pair_key(a: &Path, b: &Path) -> (String, String) {
    let key_a = absolute_string(a);
    let key_b = absolute_string(b);
    if key_a <= key_b {
        (key_a, key_b)
    } else {
        (key_b, key_a)
    }
}

fn absolute_string(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        let a = Path::new("/x/b.ts");
        let b = Path::new("/x/a.ts");
        assert_eq!(pair_key(a, b), pair_key(b, a));
        let (lesser, greater) = pair_key(a, b);
        assert!(lesser <= greater);
    }

    #[test]
    fn test_contains_symmetry() {
        let cache = SkipCache::open_in_memory().unwrap();
        let a = Path::new("/rec/show_1.ts");
        let b = Path::new("/rec/show_2.ts");
        cache.insert(a, b).unwrap();
        assert!(cache.contains(a, b).unwrap());
        assert!(cache.contains(b, a).unwrap());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let cache = SkipCache::open_in_memory().unwrap();
        let a = Path::new("/rec/show_1.ts");
        let b = Path::new("/rec/show_2.ts");
        cache.insert(a, b).unwrap();
        cache.insert(a, b).unwrap();
        cache.insert(b, a).unwrap();
        assert_eq!(cache.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_many_and_clear() {
        let mut cache = SkipCache::open_in_memory().unwrap();
        let pairs = vec![
            (PathBuf::from("/rec/a.ts"), PathBuf::from("/rec/b.ts")),
            (PathBuf::from("/rec/c.ts"), PathBuf::from("/rec/d.ts")),
            // duplicate of the first pair in swapped order
            (PathBuf::from("/rec/b.ts"), PathBuf::from("/rec/a.ts")),
        ];
        let written = cache.insert_many(&pairs).unwrap();
        assert_eq!(written, 3);
        assert_eq!(cache.count().unwrap(), 2);

        cache.clear().unwrap();
        assert_eq!(cache.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_many_empty_is_noop() {
        let mut cache = SkipCache::open_in_memory().unwrap();
        assert_eq!(cache.insert_many(&[]).unwrap(), 0);
    }

    #[test]
    fn test_unknown_pair_not_contained() {
        let cache = SkipCache::open_in_memory().unwrap();
        assert!(!cache
            .contains(Path::new("/rec/a.ts"), Path::new("/rec/b.ts"))
            .unwrap());
    }
}
