//! # Progress Reporting
//!
//! Human-readable progress lines for a batch run. The format is meant for
//! people watching a terminal and is not a stable interface.

use std::io::Write;

use tracing::warn;

use crate::config::RunnerConfig;
use crate::execution::collector::{BatchReport, BatchStatus};
use crate::job::JobRecord;

/// Receives progress notifications from the batch executor and collector
///
/// Indices are 1-based. Submission indices follow file order; completion
/// indices follow arrival order.
pub trait ProgressReporter: Send {
    fn run_started(&mut self, _source: &str, _config: &RunnerConfig, _job_count: usize) {}

    fn job_submitted(&mut self, index: usize, total: usize, job: &JobRecord);

    fn completion_started(&mut self, _total: usize) {}

    fn job_completed(&mut self, index: usize, total: usize, job: &JobRecord);

    fn run_finished(&mut self, _report: &BatchReport) {}
}

/// Writes progress lines to any [`Write`] sink, normally stdout
#[derive(Debug)]
pub struct ConsoleReporter<W: Write + Send> {
    out: W,
    write_failed: bool,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            // Only complain once; a closed stdout stays closed
            if !self.write_failed {
                warn!(error = %e, "Failed to write progress output");
                self.write_failed = true;
            }
        }
    }
}

impl<W: Write + Send> ProgressReporter for ConsoleReporter<W> {
    fn run_started(&mut self, source: &str, config: &RunnerConfig, job_count: usize) {
        self.emit(format_args!(
            "jobFile: {}, {} workers, failFast: {}",
            source,
            config.worker_count,
            config.fail_fast.is_enabled()
        ));
        self.emit(format_args!(
            "{job_count} jobs will be submitted for execution\n"
        ));
        self.emit(format_args!("Submitting for execution:"));
    }

    fn job_submitted(&mut self, index: usize, total: usize, job: &JobRecord) {
        self.emit(format_args!(
            "[{index}/{total}] Submitting job={}",
            job.raw_text()
        ));
    }

    fn completion_started(&mut self, _total: usize) {
        self.emit(format_args!("\nCompleting:"));
    }

    fn job_completed(&mut self, index: usize, total: usize, job: &JobRecord) {
        match job.failure() {
            None => self.emit(format_args!(
                "[{index}/{total}] job '{}' completed successfully={} - ({:.6} seconds)",
                job.raw_text(),
                job.is_success(),
                job.elapsed_seconds()
            )),
            Some(failure) => self.emit(format_args!(
                "[{index}/{total}] job '{}' completed successfully=false - ({:.6} seconds): {failure}",
                job.raw_text(),
                job.elapsed_seconds()
            )),
        }
    }

    fn run_finished(&mut self, report: &BatchReport) {
        match &report.status {
            BatchStatus::Completed => self.emit(format_args!(
                "\n{} jobs completed: {} succeeded, {} failed ({:.6} seconds)",
                report.completed.len(),
                report.succeeded(),
                report.failed(),
                report.wall_time.as_secs_f64()
            )),
            BatchStatus::Aborted { raw, failure, .. } => self.emit(format_args!(
                "\nAborting after {} of {} jobs: job '{raw}' {failure}",
                report.completed.len(),
                report.expected
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobFailure;
    use std::time::Duration;

    fn output(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_submission_line() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        let job = JobRecord::parse(1, "echo hi").unwrap();
        reporter.job_submitted(1, 2, &job);
        assert_eq!(output(reporter), "[1/2] Submitting job=echo hi\n");
    }

    #[test]
    fn test_success_completion_line() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        let mut job = JobRecord::parse(1, "true").unwrap();
        job.complete(Ok(()), Duration::from_millis(1500)).unwrap();
        reporter.job_completed(2, 3, &job);
        assert_eq!(
            output(reporter),
            "[2/3] job 'true' completed successfully=true - (1.500000 seconds)\n"
        );
    }

    #[test]
    fn test_failure_completion_line_includes_reason() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        let mut job = JobRecord::parse(1, "false").unwrap();
        job.complete(
            Err(JobFailure::NonZeroExit { code: Some(1) }),
            Duration::ZERO,
        )
        .unwrap();
        reporter.job_completed(1, 1, &job);
        let text = output(reporter);
        assert!(text.contains("job 'false' completed successfully=false"));
        assert!(text.trim_end().ends_with("exited with status 1"));
    }

    #[test]
    fn test_run_header() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.run_started("jobs.txt", &RunnerConfig::new(4), 7);
        let text = output(reporter);
        assert!(text.starts_with("jobFile: jobs.txt, 4 workers, failFast: false\n"));
        assert!(text.contains("7 jobs will be submitted for execution"));
    }
}
