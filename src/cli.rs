//! Command-line interface definitions.
//!
//! All CLI arguments are defined here using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and review candidates interactively
//! neardupe ~/recordings
//!
//! # See where the questions would come from, per directory
//! neardupe --stats ~/recordings
//!
//! # Move confirmed duplicates to a specific directory instead of the
//! # system trash
//! neardupe --trash-dir /storage/.recycle ~/recordings
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find files with near-duplicate names and move the spares to trash.
///
/// neardupe compares filenames (never contents) within each directory,
/// filters out episode-number and broadcast part-marker differences, and
/// asks about each surviving pair. Pairs you reject are remembered and
/// never asked again.
#[derive(Debug, Parser)]
#[command(name = "neardupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for near-duplicate filenames
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print per-directory candidate counts instead of asking questions
    #[arg(long)]
    pub stats: bool,

    /// Similarity threshold in (0, 1]; pairs scoring at or below are ignored
    #[arg(long, value_name = "RATIO", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Number of comparison workers (default: available cores, capped at 8)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Move deleted files into this directory instead of the system trash
    #[arg(long, value_name = "DIR", env = "NEARDUPE_TRASH_DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Path to the skip-cache database
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, value_name = "PATH", conflicts_with = "no_cache")]
    pub cache: Option<PathBuf>,

    /// Disable the skip cache for this run (nothing read or written)
    #[arg(long)]
    pub no_cache: bool,

    /// Clear the skip cache before scanning
    #[arg(long)]
    pub clear_cache: bool,

    /// Delete without per-file confirmation during the deletion pass
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and prompts
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Emit errors as JSON on stderr (for scripting)
    #[arg(long)]
    pub json_errors: bool,
}

/// Parse and validate the similarity threshold.
fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(threshold)
    } else {
        Err(format!("threshold must be in (0, 1], got {threshold}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal() {
        let cli = Cli::parse_from(["neardupe", "/recordings"]);
        assert_eq!(cli.path, PathBuf::from("/recordings"));
        assert!(!cli.stats);
        assert!(cli.threshold.is_none());
        assert!(!cli.no_cache);
    }

    #[test]
    fn test_cli_threshold_valid() {
        let cli = Cli::parse_from(["neardupe", "--threshold", "0.9", "/r"]);
        assert_eq!(cli.threshold, Some(0.9));
    }

    #[test]
    fn test_cli_threshold_out_of_range() {
        assert!(Cli::try_parse_from(["neardupe", "--threshold", "1.5", "/r"]).is_err());
        assert!(Cli::try_parse_from(["neardupe", "--threshold", "0", "/r"]).is_err());
        assert!(Cli::try_parse_from(["neardupe", "--threshold", "abc", "/r"]).is_err());
    }

    #[test]
    fn test_cli_cache_conflicts_with_no_cache() {
        assert!(
            Cli::try_parse_from(["neardupe", "--cache", "/tmp/c.db", "--no-cache", "/r"]).is_err()
        );
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["neardupe", "-q", "-v", "/r"]).is_err());
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(Cli::try_parse_from(["neardupe"]).is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
