//! # Batch Executor
//!
//! Wires one batch end to end: announce submissions, fill the job queue,
//! start the worker pool, collect results and shut the pool down.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, instrument};

use super::collector::{BatchReport, ResultCollector};
use super::queue::JobQueue;
use super::runner::CommandRunner;
use super::worker_pool::WorkerPool;
use crate::config::RunnerConfig;
use crate::error::Result;
use crate::job::JobRecord;
use crate::reporting::ProgressReporter;

/// Runs batches of jobs with a fixed configuration and runner
pub struct BatchExecutor<R: CommandRunner> {
    config: RunnerConfig,
    runner: Arc<R>,
}

impl<R: CommandRunner> std::fmt::Debug for BatchExecutor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("config", &self.config)
            .field("runner", &self.runner.name())
            .finish()
    }
}

impl<R: CommandRunner> BatchExecutor<R> {
    pub fn new(config: RunnerConfig, runner: R) -> Self {
        Self::with_shared_runner(config, Arc::new(runner))
    }

    pub fn with_shared_runner(config: RunnerConfig, runner: Arc<R>) -> Self {
        Self { config, runner }
    }

    /// Execute `jobs` and return once every result is in or fail-fast fired
    ///
    /// Workers are joined before this returns. On a fail-fast abort, jobs
    /// still queued never start and in-flight jobs are abandoned.
    #[instrument(skip_all, fields(job_count = jobs.len(), worker_count = self.config.worker_count))]
    pub async fn run(
        &self,
        jobs: Vec<JobRecord>,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<BatchReport> {
        self.config.validate()?;

        let total = jobs.len();
        for (index, job) in jobs.iter().enumerate() {
            reporter.job_submitted(index + 1, total, job);
        }

        let queue = JobQueue::populate(jobs)?;
        let (result_sender, mut result_receiver) =
            mpsc::channel(self.config.effective_result_buffer());

        info!(
            queue_capacity = queue.capacity(),
            result_buffer = self.config.effective_result_buffer(),
            fail_fast = %self.config.fail_fast,
            "🚀 BATCH: Jobs enqueued, starting workers"
        );

        let pool = WorkerPool::start(
            self.config.worker_count,
            queue,
            result_sender,
            self.runner.clone(),
        )?;

        reporter.completion_started(total);
        let collected = ResultCollector::new(self.config.fail_fast)
            .collect(&mut result_receiver, total, reporter)
            .await;

        // Unblock any worker waiting on a full channel before joining
        drop(result_receiver);
        let stats = pool.shutdown().await;

        let report = collected?;
        info!(
            collected = report.completed.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            aborted = report.is_aborted(),
            abandoned = stats.abandoned_jobs,
            wall_time_ms = report.wall_time.as_millis() as u64,
            "✅ BATCH: Finished"
        );

        reporter.run_finished(&report);
        Ok(report)
    }
}
