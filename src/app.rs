//! Application pipeline.
//!
//! Wires the phases together: list files → precompute records → parallel
//! comparison sweep → skip-cache filtering → interactive confirmation →
//! deletion pass → skip-cache commit → summary. Cancellation can fire at
//! any checkpoint; an interrupted session keeps its partial results on
//! screen but never writes the skip cache.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use yansi::Paint;

use crate::actions::{
    execute_deletions, Confirmer, DeleteOutcome, StdinConfirmer, StdinDeletePrompt, TrashTarget,
    Verdict,
};
use crate::cache::SkipCache;
use crate::cli::Cli;
use crate::compare::{
    count_valid_comparisons, default_workers, find_candidates, CandidatePair, SchedulerConfig,
    DEFAULT_MATCH_THRESHOLD,
};
use crate::config::Config;
use crate::error::ExitCode;
use crate::progress::{
    Progress, ProgressCallback, PHASE_COMPARE, PHASE_LISTING, PHASE_PRECOMPUTE,
};
use crate::scanner::{list_files, precompute_records, sort_by_mtime};
use crate::signal::{install_handler, CancelToken};
use crate::stats::{collect_dir_stats, print_stats_table};

/// Final counters exposed for the summary line.
#[derive(Debug, Default, Clone)]
pub struct SessionSummary {
    /// Files that survived precompute.
    pub files_scanned: usize,
    /// Same-directory comparisons evaluated.
    pub valid_comparisons: u64,
    /// Candidate pairs produced by the sweep.
    pub candidates_found: usize,
    /// Candidates suppressed by the skip cache.
    pub cached_skipped: usize,
    /// Pairs the user confirmed as duplicates.
    pub confirmed: usize,
    /// Files actually moved to trash.
    pub deleted: usize,
    /// Rejected pairs persisted to the skip cache.
    pub cache_entries_saved: usize,
}

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code for a completed (possibly interrupted) session;
/// `Err` is reserved for failures that abort the pipeline.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    crate::logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load();
    let cancel = install_handler()?;

    let threshold = cli
        .threshold
        .or(config.threshold)
        .unwrap_or(DEFAULT_MATCH_THRESHOLD);
    let workers = cli
        .workers
        .or(config.workers)
        .filter(|&w| w > 0)
        .unwrap_or_else(default_workers);
    let trash_target = cli
        .trash_dir
        .clone()
        .or_else(|| config.trash_dir.clone())
        .map(TrashTarget::Directory)
        .unwrap_or(TrashTarget::SystemTrash);

    let mut cache = open_cache(&cli, &config)?;
    if cli.clear_cache {
        if let Some(cache) = &cache {
            cache.clear().context("Failed to clear the skip cache")?;
            log::info!("Skip cache cleared");
        }
    }

    if cli.stats {
        return run_stats(&cli, threshold, &cancel);
    }

    let mut summary = SessionSummary::default();
    let progress = Progress::new(cli.quiet);

    // Phase: discovery, oldest modification time first.
    progress.on_phase_start(PHASE_LISTING, 0);
    let paths = list_files(&cli.path, &progress, &cancel)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;
    let paths = sort_by_mtime(paths);
    progress.on_phase_end(PHASE_LISTING);
    if cancel.is_cancelled() {
        return finish_interrupted(&summary);
    }

    // Phase: metadata records.
    progress.on_phase_start(PHASE_PRECOMPUTE, paths.len() as u64);
    let records = precompute_records(&paths, &cli.path, &progress, &cancel);
    progress.on_phase_end(PHASE_PRECOMPUTE);
    summary.files_scanned = records.len();
    if cancel.is_cancelled() {
        return finish_interrupted(&summary);
    }

    // Phase: parallel comparison sweep.
    let total_comparisons = count_valid_comparisons(&records);
    log::debug!(
        "{} records, {} same-directory pairs to evaluate",
        records.len(),
        total_comparisons
    );
    progress.on_phase_start(PHASE_COMPARE, total_comparisons);
    let outcome = find_candidates(
        Arc::new(records),
        &SchedulerConfig { workers, threshold },
        &progress,
        &cancel,
    )?;
    progress.on_phase_end(PHASE_COMPARE);
    summary.valid_comparisons = outcome.valid_comparisons;
    summary.candidates_found = outcome.candidates.len();
    if outcome.interrupted {
        return finish_interrupted(&summary);
    }

    // Suppress pairs the user already rejected in an earlier session.
    let (questions, cached_skipped) = filter_cached(outcome.candidates, cache.as_ref())?;
    summary.cached_skipped = cached_skipped;
    if cached_skipped > 0 {
        println!(
            "{}",
            format!("{cached_skipped} previously rejected pair(s) skipped").dim()
        );
    }

    if questions.is_empty() {
        println!("{}", "No duplicate candidates found".green());
        print_summary(&summary);
        return Ok(ExitCode::NoCandidates);
    }

    // Interactive confirmation, one pair at a time.
    let mut confirmer = StdinConfirmer;
    let (accepted, rejected) = run_confirmations(&questions, &mut confirmer, &cancel)?;
    summary.confirmed = accepted.len();
    if cancel.is_cancelled() {
        // partial verdicts are discarded: never persist answers the user
        // may not have meant to finalize
        return finish_interrupted(&summary);
    }

    // Deletion pass with final per-file confirmation.
    let delete_outcome = if accepted.is_empty() {
        DeleteOutcome::default()
    } else {
        println!();
        println!("{}", "Final check before anything is moved".yellow().bold());
        execute_deletions(&accepted, &trash_target, &mut StdinDeletePrompt, cli.yes)?
    };
    summary.deleted = delete_outcome.deleted;

    // Commit rejections only for clean sessions: an `n` during the final
    // check suggests earlier answers may have been mistaken too.
    let clean = !cancel.is_cancelled() && !delete_outcome.rejected_any;
    if clean && !rejected.is_empty() {
        if let Some(cache) = cache.as_mut() {
            summary.cache_entries_saved = cache
                .insert_many(&rejected)
                .context("Failed to persist the skip cache")?;
            println!(
                "{}",
                format!(
                    "{} rejected pair(s) remembered",
                    summary.cache_entries_saved
                )
                .dim()
            );
        }
    } else if !rejected.is_empty() {
        println!("{}", "Skip cache not updated".yellow());
    }

    if cancel.is_cancelled() {
        return finish_interrupted(&summary);
    }

    print_summary(&summary);
    Ok(ExitCode::Success)
}

/// Resolve and open the skip cache, honoring `--no-cache`.
fn open_cache(cli: &Cli, config: &Config) -> Result<Option<SkipCache>> {
    if cli.no_cache {
        return Ok(None);
    }
    let path = match cli.cache.clone().or_else(|| config.cache_path.clone()) {
        Some(path) => path,
        None => SkipCache::default_path().context("Failed to locate the skip cache")?,
    };
    log::debug!("Skip cache at {}", path.display());
    let cache = SkipCache::open(&path)
        .with_context(|| format!("Failed to open skip cache at {}", path.display()))?;
    Ok(Some(cache))
}

/// Drop candidates whose path pair is already in the skip cache.
fn filter_cached(
    candidates: Vec<CandidatePair>,
    cache: Option<&SkipCache>,
) -> Result<(Vec<CandidatePair>, usize)> {
    let Some(cache) = cache else {
        return Ok((candidates, 0));
    };
    let mut kept = Vec::with_capacity(candidates.len());
    let mut skipped = 0;
    for pair in candidates {
        if cache
            .contains(&pair.older.path, &pair.newer.path)
            .context("Skip cache query failed")?
        {
            skipped += 1;
        } else {
            kept.push(pair);
        }
    }
    Ok((kept, skipped))
}

/// Walk the question list collecting accepted pairs and rejected path
/// pairs. `q` stops early; cancellation is checked between questions.
fn run_confirmations(
    questions: &[CandidatePair],
    confirmer: &mut dyn Confirmer,
    cancel: &CancelToken,
) -> Result<(Vec<CandidatePair>, Vec<(PathBuf, PathBuf)>)> {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, pair) in questions.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        match confirmer.confirm(pair, index + 1, questions.len())? {
            Verdict::Accept => accepted.push(pair.clone()),
            Verdict::Reject => rejected.push((pair.older.path.clone(), pair.newer.path.clone())),
            Verdict::Quit => break,
        }
    }

    Ok((accepted, rejected))
}

/// Stats mode: no questions, just per-directory candidate counts.
fn run_stats(cli: &Cli, threshold: f64, cancel: &CancelToken) -> Result<ExitCode> {
    println!("Collecting per-directory statistics for {}", cli.path.display());

    let paths = list_files(&cli.path, &crate::progress::NullProgress, cancel)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;
    let paths = sort_by_mtime(paths);
    println!("  {} files", paths.len());

    let records = precompute_records(&paths, &cli.path, &crate::progress::NullProgress, cancel);
    if cancel.is_cancelled() {
        println!("{}", "Interrupted".yellow());
        return Ok(ExitCode::Interrupted);
    }

    let stats = collect_dir_stats(&records, threshold, &cli.path, cancel);
    print_stats_table(&stats, &records);

    if cancel.is_cancelled() {
        println!("{}", "Interrupted".yellow());
        return Ok(ExitCode::Interrupted);
    }
    Ok(ExitCode::Success)
}

/// Interrupted sessions report distinctly from "completed, found nothing".
fn finish_interrupted(summary: &SessionSummary) -> Result<ExitCode> {
    println!("{}", "Interrupted".yellow().bold());
    print_summary(summary);
    Ok(ExitCode::Interrupted)
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!(
        "{} {} file(s), {} comparison(s), {} candidate(s), {} cached, {} confirmed, {} deleted",
        "Done:".green().bold(),
        summary.files_scanned,
        summary.valid_comparisons,
        summary.candidates_found,
        summary.cached_skipped,
        summary.confirmed,
        summary.deleted,
    );
}
