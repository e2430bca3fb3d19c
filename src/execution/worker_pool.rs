//! # Worker Pool
//!
//! A fixed number of symmetric execution loops for one batch. Each worker
//! claims one job at a time from the [`JobQueue`], runs it through the
//! [`CommandRunner`], stamps the outcome and elapsed time on the record and
//! hands it to the result channel.
//!
//! ```text
//! JobQueue ─┬─→ worker 1 ─┐
//!           ├─→ worker 2 ─┼─→ result channel ─→ ResultCollector
//!           └─→ worker N ─┘
//! ```
//!
//! Workers exit on their own once the queue is drained. [`WorkerPool::shutdown`]
//! additionally cancels them (abandoning in-flight jobs) and joins every task,
//! so no worker outlives the batch.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::queue::JobQueue;
use super::runner::CommandRunner;
use crate::job::JobRecord;

#[derive(Debug, Error)]
pub enum WorkerPoolError {
    #[error("Worker pool needs at least one worker")]
    NoWorkers,
}

/// Per-worker counters, returned when the worker exits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerState {
    pub worker_id: usize,
    pub jobs_processed: u64,
    pub successful_jobs: u64,
    pub failed_jobs: u64,
    /// Set when the worker stopped mid-job because of a shutdown
    pub abandoned_job: bool,
}

impl WorkerState {
    fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }

    fn record(&mut self, job: &JobRecord) {
        self.jobs_processed += 1;
        if job.is_success() {
            self.successful_jobs += 1;
        } else {
            self.failed_jobs += 1;
        }
    }
}

/// Aggregate of every worker's counters after shutdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerPoolStats {
    pub total_workers: usize,
    pub joined_workers: usize,
    pub panicked_workers: usize,
    pub jobs_processed: u64,
    pub successful_jobs: u64,
    pub failed_jobs: u64,
    pub abandoned_jobs: u64,
}

impl WorkerPoolStats {
    fn from_workers(total_workers: usize, workers: &[WorkerState]) -> Self {
        Self {
            total_workers,
            joined_workers: workers.len(),
            panicked_workers: total_workers - workers.len(),
            jobs_processed: workers.iter().map(|w| w.jobs_processed).sum(),
            successful_jobs: workers.iter().map(|w| w.successful_jobs).sum(),
            failed_jobs: workers.iter().map(|w| w.failed_jobs).sum(),
            abandoned_jobs: workers.iter().filter(|w| w.abandoned_job).count() as u64,
        }
    }
}

/// Running workers for a single batch
pub struct WorkerPool {
    workers: Vec<JoinHandle<WorkerState>>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_count", &self.workers.len())
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl WorkerPool {
    /// Spawn `worker_count` workers consuming `queue` and feeding `results`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<R: CommandRunner>(
        worker_count: usize,
        queue: JobQueue,
        results: mpsc::Sender<JobRecord>,
        runner: Arc<R>,
    ) -> Result<Self, WorkerPoolError> {
        if worker_count == 0 {
            return Err(WorkerPoolError::NoWorkers);
        }

        info!(
            worker_count,
            runner = runner.name(),
            "🏊 POOL: Starting workers"
        );

        let shutdown = CancellationToken::new();
        let workers = (1..=worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    queue.clone(),
                    results.clone(),
                    runner.clone(),
                    shutdown.child_token(),
                ))
            })
            .collect();

        Ok(Self { workers, shutdown })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Cancel every worker and wait for all of them to exit
    pub async fn shutdown(mut self) -> WorkerPoolStats {
        self.shutdown.cancel();

        let total_workers = self.workers.len();
        let handles = std::mem::take(&mut self.workers);

        let mut finished = Vec::with_capacity(total_workers);
        for joined in join_all(handles).await {
            match joined {
                Ok(state) => finished.push(state),
                Err(e) => error!(error = %e, "❌ POOL: Worker task failed"),
            }
        }

        let stats = WorkerPoolStats::from_workers(total_workers, &finished);
        info!(
            joined = stats.joined_workers,
            processed = stats.jobs_processed,
            abandoned = stats.abandoned_jobs,
            "🛑 POOL: All workers stopped"
        );
        stats
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Detached workers still observe the token and stop
        self.shutdown.cancel();
    }
}

/// One worker's loop: claim, execute, stamp, forward
async fn run_worker<R: CommandRunner>(
    worker_id: usize,
    queue: JobQueue,
    results: mpsc::Sender<JobRecord>,
    runner: Arc<R>,
    shutdown: CancellationToken,
) -> WorkerState {
    let mut state = WorkerState::new(worker_id);
    debug!(worker_id, "Worker started");

    loop {
        let mut job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = queue.next() => match next {
                Some(job) => job,
                None => break,
            },
        };

        debug!(
            worker_id,
            job_id = %job.id(),
            sequence = job.sequence(),
            command = %job.command(),
            "Claimed job"
        );

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                warn!(
                    worker_id,
                    job_id = %job.id(),
                    raw = %job.raw_text(),
                    "Shutdown while job in flight, abandoning it"
                );
                state.abandoned_job = true;
                break;
            }
            outcome = runner.run(job.command()) => outcome,
        };
        let elapsed = started.elapsed();

        if let Err(e) = job.complete(outcome, elapsed) {
            error!(worker_id, error = %e, "Job completed twice, dropping result");
            continue;
        }
        state.record(&job);

        debug!(
            worker_id,
            job_id = %job.id(),
            status = %job.status(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Job finished"
        );

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            sent = results.send(job) => {
                if sent.is_err() {
                    debug!(worker_id, "Result channel closed, worker exiting");
                    break;
                }
            }
        }
    }

    debug!(
        worker_id,
        processed = state.jobs_processed,
        "Worker stopped"
    );
    state
}
