//! # Result Collector
//!
//! The single consumer of the result channel. It drains exactly as many
//! records as were submitted, in arrival order, reports each one and applies
//! the fail-fast policy.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::FailFastPolicy;
use crate::constants::exit_codes;
use crate::error::{JobRunError, Result};
use crate::job::{JobFailure, JobRecord};
use crate::reporting::ProgressReporter;

/// How a batch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every submitted job reported back
    Completed,
    /// Fail-fast stopped the run at this job
    Aborted {
        sequence: usize,
        raw: String,
        failure: JobFailure,
    },
}

/// Everything the collector saw, in arrival order
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub completed: Vec<JobRecord>,
    pub expected: usize,
    pub wall_time: Duration,
}

impl BatchReport {
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, BatchStatus::Aborted { .. })
    }

    pub fn succeeded(&self) -> usize {
        self.completed.iter().filter(|job| job.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.completed.len() - self.succeeded()
    }

    /// Process exit code for this outcome; job failures alone do not change it
    pub fn exit_code(&self) -> u8 {
        match self.status {
            BatchStatus::Completed => exit_codes::SUCCESS,
            BatchStatus::Aborted { .. } => exit_codes::FAIL_FAST,
        }
    }
}

/// Drains the result channel for one batch
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultCollector {
    fail_fast: FailFastPolicy,
}

impl ResultCollector {
    pub fn new(fail_fast: FailFastPolicy) -> Self {
        Self { fail_fast }
    }

    /// Receive `expected` results, reporting each as it arrives
    ///
    /// Returns early with [`BatchStatus::Aborted`] on the first failure when
    /// fail-fast is enabled. Errors if the channel closes first.
    pub async fn collect(
        &self,
        results: &mut mpsc::Receiver<JobRecord>,
        expected: usize,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<BatchReport> {
        let started = Instant::now();
        let mut completed = Vec::with_capacity(expected);

        while completed.len() < expected {
            let Some(job) = results.recv().await else {
                return Err(JobRunError::ResultChannelClosed {
                    received: completed.len(),
                    expected,
                });
            };

            let index = completed.len() + 1;
            reporter.job_completed(index, expected, &job);

            debug!(
                index,
                expected,
                job_id = %job.id(),
                sequence = job.sequence(),
                success = job.is_success(),
                elapsed_seconds = job.elapsed_seconds(),
                "Job result collected"
            );

            if let Some(failure) = job.failure().filter(|_| self.fail_fast.is_enabled()) {
                warn!(
                    sequence = job.sequence(),
                    raw = %job.raw_text(),
                    failure = %failure,
                    collected = index,
                    expected,
                    "Fail-fast: aborting run on first failure"
                );

                let status = BatchStatus::Aborted {
                    sequence: job.sequence(),
                    raw: job.raw_text().to_string(),
                    failure: failure.clone(),
                };
                completed.push(job);

                return Ok(BatchReport {
                    status,
                    completed,
                    expected,
                    wall_time: started.elapsed(),
                });
            }

            completed.push(job);
        }

        Ok(BatchReport {
            status: BatchStatus::Completed,
            completed,
            expected,
            wall_time: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        completed: Vec<(usize, usize, String)>,
    }

    impl ProgressReporter for Recording {
        fn job_submitted(&mut self, _index: usize, _total: usize, _job: &JobRecord) {}

        fn job_completed(&mut self, index: usize, total: usize, job: &JobRecord) {
            self.completed.push((index, total, job.raw_text().to_string()));
        }
    }

    fn finished(
        sequence: usize,
        raw: &str,
        outcome: std::result::Result<(), JobFailure>,
    ) -> JobRecord {
        let mut job = JobRecord::parse(sequence, raw).unwrap();
        job.complete(outcome, Duration::from_millis(1)).unwrap();
        job
    }

    async fn channel_with(jobs: Vec<JobRecord>) -> mpsc::Receiver<JobRecord> {
        let (tx, rx) = mpsc::channel(jobs.len().max(1));
        for job in jobs {
            tx.send(job).await.unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_collects_all_results_despite_failures() {
        let mut rx = channel_with(vec![
            finished(2, "false", Err(JobFailure::NonZeroExit { code: Some(1) })),
            finished(1, "true", Ok(())),
        ])
        .await;
        let mut reporter = Recording::default();

        let report = ResultCollector::new(FailFastPolicy::Disabled)
            .collect(&mut rx, 2, &mut reporter)
            .await
            .unwrap();

        assert_eq!(report.status, BatchStatus::Completed);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.exit_code(), exit_codes::SUCCESS);
        assert_eq!(
            reporter.completed,
            vec![(1, 2, "false".to_string()), (2, 2, "true".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_failure() {
        let mut rx = channel_with(vec![
            finished(1, "true", Ok(())),
            finished(2, "missing", Err(JobFailure::spawn_failed("not found"))),
            finished(3, "true", Ok(())),
        ])
        .await;
        let mut reporter = Recording::default();

        let report = ResultCollector::new(FailFastPolicy::Enabled)
            .collect(&mut rx, 3, &mut reporter)
            .await
            .unwrap();

        assert!(report.is_aborted());
        assert_eq!(report.exit_code(), exit_codes::FAIL_FAST);
        assert_eq!(report.completed.len(), 2);
        assert!(matches!(
            report.status,
            BatchStatus::Aborted { sequence: 2, .. }
        ));
        // The failing job is still reported before the abort
        assert_eq!(reporter.completed.len(), 2);
    }

    #[tokio::test]
    async fn test_closed_channel_is_an_error_not_a_hang() {
        let mut rx = channel_with(vec![finished(1, "true", Ok(()))]).await;
        let mut reporter = Recording::default();

        let err = ResultCollector::default()
            .collect(&mut rx, 3, &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            JobRunError::ResultChannelClosed {
                received: 1,
                expected: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_zero_expected_returns_immediately() {
        let (_tx, mut rx) = mpsc::channel::<JobRecord>(1);
        let report = ResultCollector::default()
            .collect(&mut rx, 0, &mut Recording::default())
            .await
            .unwrap();
        assert_eq!(report.status, BatchStatus::Completed);
        assert!(report.completed.is_empty());
    }
}
