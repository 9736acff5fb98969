//! Parallel comparison scheduling.
//!
//! # Overview
//!
//! The comparison space is every pair of records sharing a directory, out
//! of `n·(n-1)/2` possible pairs. Rather than materializing pairs, tasks
//! are ranges of *start indices*: a task owning start index `i` compares
//! record `i` against every record `j > i`. Ranges are built greedily so
//! each task carries a similar number of comparisons, balancing per-task
//! overhead against progress granularity.
//!
//! Workers run on a fixed-size rayon pool and share one read-only
//! `Arc<[FileRecord]>`; nothing is copied per task and nothing is ever
//! mutated, so no locking is involved. Results flow back over a channel
//! and are aggregated in completion order; a final sort by the older
//! record's discovery ordinal makes the output order reproducible across
//! runs regardless of task interleaving.
//!
//! Cancellation is task-granular: the token is polled before a worker
//! starts a task and in the aggregation loop, never mid-task, so the
//! worst-case latency is one task's wall-clock cost (bounded by
//! [`MAX_COMPARISONS_PER_TASK`]).

use std::ops::Range;
use std::sync::mpsc;
use std::sync::Arc;

use rayon::ThreadPoolBuilder;

use super::filters::compare_records;
use super::CandidatePair;
use crate::progress::ProgressCallback;
use crate::scanner::FileRecord;
use crate::signal::CancelToken;

/// Lower bound on the task count, before the worker multiplier.
const MIN_TASKS: usize = 200;

/// Additional task-count floor per worker.
const TASKS_PER_WORKER: usize = 50;

/// Hard cap on comparisons per task so progress stays responsive on large
/// scans and cancellation latency stays bounded.
pub const MAX_COMPARISONS_PER_TASK: u64 = 500_000;

/// Errors from the comparison scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The worker pool could not be constructed.
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for a comparison sweep.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Similarity threshold handed to the filter cascade.
    pub threshold: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            threshold: super::filters::DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// Default worker count: one per available core, capped at 8.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
        .min(8)
}

/// Result of a comparison sweep.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// Candidate pairs, sorted by the older record's discovery ordinal.
    pub candidates: Vec<CandidatePair>,
    /// Same-directory comparisons actually evaluated.
    pub valid_comparisons: u64,
    /// Whether the sweep was cut short by cancellation.
    pub interrupted: bool,
}

/// What one task sends back to the aggregation loop.
struct TaskResult {
    pairs: Vec<CandidatePair>,
    valid_comparisons: u64,
}

/// Run the filter cascade over every same-directory pair.
///
/// Fans tasks out over a dedicated pool, reports one progress increment
/// per completed task, and returns early with the results aggregated so
/// far when `cancel` fires. A panic inside a worker task is not caught:
/// partial comparison coverage silently missing a duplicate would be
/// worse than a hard stop.
pub fn find_candidates(
    records: Arc<Vec<FileRecord>>,
    config: &SchedulerConfig,
    progress: &dyn ProgressCallback,
    cancel: &CancelToken,
) -> Result<SweepOutcome, ScheduleError> {
    let n = records.len();
    let mut outcome = SweepOutcome::default();
    if n < 2 {
        return Ok(outcome);
    }

    let workers = config.workers.max(1);
    let tasks = partition_tasks(n, workers);
    log::debug!(
        "Scheduler: {} records, {} tasks, {} workers",
        n,
        tasks.len(),
        workers
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("compare-{i}"))
        .build()?;

    let (tx, rx) = mpsc::channel::<TaskResult>();
    let threshold = config.threshold;

    for task in tasks {
        let records = Arc::clone(&records);
        let tx = tx.clone();
        let cancel = cancel.clone();
        pool.spawn(move || {
            // task-granular cancellation: skip entirely, never mid-sweep
            if cancel.is_cancelled() {
                return;
            }
            let result = compare_range(&records, task, threshold);
            // receiver may be gone after cancellation; nothing to do then
            let _ = tx.send(result);
        });
    }
    drop(tx);

    // Aggregation in completion order, one progress increment per task.
    for result in rx {
        outcome.valid_comparisons += result.valid_comparisons;
        progress.on_compared(result.valid_comparisons, result.pairs.len() as u64);
        outcome.candidates.extend(result.pairs);

        if cancel.is_cancelled() {
            outcome.interrupted = true;
            break;
        }
    }

    if cancel.is_cancelled() {
        outcome.interrupted = true;
    }

    // completion order is nondeterministic; present questions in a stable
    // order instead
    outcome
        .candidates
        .sort_by_key(|pair| (pair.older.ordinal, pair.newer.ordinal));

    Ok(outcome)
}

/// One worker task: all pairs `(i, j)` with `i` in `starts` and `j > i`.
///
/// Directory-mismatched pairs are skipped without counting toward the
/// valid-comparison total.
fn compare_range(records: &[FileRecord], starts: Range<usize>, threshold: f64) -> TaskResult {
    let mut pairs = Vec::new();
    let mut valid_comparisons = 0u64;

    for i in starts {
        let a = &records[i];
        for b in &records[i + 1..] {
            if a.dir_path != b.dir_path {
                continue;
            }
            valid_comparisons += 1;
            if let Some(pair) = compare_records(a, b, threshold) {
                pairs.push(pair);
            }
        }
    }

    TaskResult {
        pairs,
        valid_comparisons,
    }
}

/// Split start indices `0..n-1` into ranges of roughly equal comparison
/// counts.
///
/// Start index `i` owns `n-1-i` comparisons. Indices are accumulated until
/// the running sum reaches the per-task target, derived from a floor of
/// `max(MIN_TASKS, workers * TASKS_PER_WORKER)` tasks overall and capped
/// at [`MAX_COMPARISONS_PER_TASK`].
fn partition_tasks(n: usize, workers: usize) -> Vec<Range<usize>> {
    debug_assert!(n >= 2);
    let total_comparisons = (n as u64) * (n as u64 - 1) / 2;
    let min_tasks = MIN_TASKS.max(workers * TASKS_PER_WORKER) as u64;
    let target_per_task = MAX_COMPARISONS_PER_TASK.min((total_comparisons / min_tasks).max(1));

    let mut tasks = Vec::new();
    let mut current_start = 0usize;
    let mut current_count = 0u64;

    for i in 0..n - 1 {
        current_count += (n - 1 - i) as u64;
        if current_count >= target_per_task || i == n - 2 {
            tasks.push(current_start..i + 1);
            current_start = i + 1;
            current_count = 0;
        }
    }

    tasks
}
