//! Deletion pass over accepted candidate pairs.
//!
//! Each accepted pair's *newer* file is moved out of the way: into a
//! configured trash directory (rename, with a copy+remove fallback for
//! cross-device moves) or the system trash when no directory is set.
//! A final per-pair confirmation runs before each move; answering `a`
//! applies the remaining moves without further prompts. Files that
//! vanished since the scan are reported and skipped, never aborting the
//! batch.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use yansi::Paint;

use crate::compare::CandidatePair;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Moving into the trash directory failed.
    #[error("failed to move {path} to trash: {source}")]
    Move {
        /// File being moved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The system trash operation failed.
    #[error("system trash failed for {path}: {message}")]
    SystemTrash {
        /// File being trashed
        path: PathBuf,
        /// Error description from the trash backend
        message: String,
    },

    /// Reading the confirmation answer failed.
    #[error("failed to read confirmation input: {0}")]
    Prompt(#[from] io::Error),
}

/// Where deleted files go.
#[derive(Debug, Clone)]
pub enum TrashTarget {
    /// Move into this directory (created on first use).
    Directory(PathBuf),
    /// Use the platform recycle bin.
    SystemTrash,
}

/// Per-pair answer during the deletion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    /// Delete this one.
    Yes,
    /// Keep this one.
    No,
    /// Delete this one and all remaining without asking again.
    All,
}

/// Source of deletion confirmations; scripted in tests.
pub trait DeletePrompt {
    /// Ask whether to delete the newer file of `pair`.
    fn ask(&mut self, pair: &CandidatePair, index: usize, total: usize)
        -> io::Result<DeleteChoice>;
}

/// Interactive stdin-backed deletion prompt.
pub struct StdinDeletePrompt;

impl DeletePrompt for StdinDeletePrompt {
    fn ask(
        &mut self,
        pair: &CandidatePair,
        index: usize,
        total: usize,
    ) -> io::Result<DeleteChoice> {
        super::confirm::print_candidate(pair, index, total);
        print!("{} ", "Delete the newer file? [y/n/a]:".red());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(DeleteChoice::No);
        }

        Ok(match input.trim().to_lowercase().as_str() {
            "y" => DeleteChoice::Yes,
            "a" => DeleteChoice::All,
            _ => DeleteChoice::No,
        })
    }
}

/// Result of the deletion pass.
#[derive(Debug, Default, Clone)]
pub struct DeleteOutcome {
    /// Files actually moved to trash.
    pub deleted: usize,
    /// Files that had vanished before their turn.
    pub missing: usize,
    /// Whether the user answered `n` for any pair. A rejection here means
    /// the session's skip-cache write is withheld.
    pub rejected_any: bool,
}

/// Run the deletion pass over accepted pairs.
///
/// `assume_yes` skips prompting entirely (the `--yes` flag). Vanished
/// files count as missing and the loop continues; move failures are
/// errors since silently keeping a confirmed duplicate defeats the run.
pub fn execute_deletions(
    accepted: &[CandidatePair],
    target: &TrashTarget,
    prompt: &mut dyn DeletePrompt,
    assume_yes: bool,
) -> Result<DeleteOutcome, DeleteError> {
    let mut outcome = DeleteOutcome::default();
    if accepted.is_empty() {
        return Ok(outcome);
    }

    if let TrashTarget::Directory(dir) = target {
        fs::create_dir_all(dir).map_err(|e| DeleteError::Move {
            path: dir.clone(),
            source: e,
        })?;
    }

    let mut process_all = assume_yes;

    for (index, pair) in accepted.iter().enumerate() {
        let victim = &pair.newer.path;

        if !victim.is_file() {
            log::warn!("Deletion: {} vanished, skipping", victim.display());
            println!("{}", format!("missing: {}", victim.display()).yellow());
            outcome.missing += 1;
            continue;
        }

        let choice = if process_all {
            DeleteChoice::Yes
        } else {
            prompt.ask(pair, index + 1, accepted.len())?
        };

        match choice {
            DeleteChoice::All => {
                process_all = true;
                move_to_trash(victim, target)?;
                outcome.deleted += 1;
            }
            DeleteChoice::Yes => {
                move_to_trash(victim, target)?;
                outcome.deleted += 1;
            }
            DeleteChoice::No => {
                outcome.rejected_any = true;
            }
        }
    }

    Ok(outcome)
}

/// Move one file to the configured trash location.
pub fn move_to_trash(path: &Path, target: &TrashTarget) -> Result<(), DeleteError> {
    if !path.is_file() {
        return Err(DeleteError::NotFound(path.to_path_buf()));
    }

    match target {
        TrashTarget::Directory(dir) => {
            let dst = unique_destination(dir, path);
            rename_or_copy(path, &dst)?;
            log::info!("Moved {} -> {}", path.display(), dst.display());
        }
        TrashTarget::SystemTrash => {
            trash::delete(path).map_err(|e| DeleteError::SystemTrash {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            log::info!("Trashed {}", path.display());
        }
    }

    Ok(())
}

/// Pick a non-colliding destination inside the trash directory.
///
/// A name already present gets a `~N` suffix rather than overwriting a
/// previously trashed file.
fn unique_destination(dir: &Path, src: &Path) -> PathBuf {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    let candidate = dir.join(&name);
    if !candidate.exists() {
        return candidate;
    }
    for n in 1.. {
        let candidate = dir.join(format!("{name}~{n}"));
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

/// Rename, falling back to copy+remove when the trash directory is on a
/// different filesystem.
fn rename_or_copy(src: &Path, dst: &Path) -> Result<(), DeleteError> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    fs::copy(src, dst)
        .and_then(|_| fs::remove_file(src))
        .map_err(|e| DeleteError::Move {
            path: src.to_path_buf(),
            source: e,
        })
}
