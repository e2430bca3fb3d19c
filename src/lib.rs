#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Parallel Jobs
//!
//! Runs the commands of a line-oriented job file across a fixed-size pool of
//! concurrent workers and reports per-job completion status and timing.
//!
//! ## Architecture
//!
//! ```text
//! job file ─→ tokenizer ─→ JobRecords ─→ JobQueue ─→ WorkerPool (N tasks)
//!                                                        │
//!                        ProgressReporter ←─ ResultCollector ←─ result channel
//! ```
//!
//! - The job queue is filled completely before any worker starts and is sized
//!   to the batch, so enqueueing never blocks.
//! - Each worker claims one job at a time, runs it as a child process and
//!   forwards the completed record. Completion order is arrival order.
//! - The collector drains exactly as many results as were submitted. With
//!   fail-fast enabled it stops at the first failure and the pool is shut
//!   down, killing in-flight children.
//!
//! ## Module Organization
//!
//! - [`job`] - tokenizer, job records and job file reading
//! - [`execution`] - queue, command runner, worker pool, collector, batch executor
//! - [`reporting`] - human-readable progress output
//! - [`config`] - layered runner configuration
//! - [`logging`] - structured logging setup
//! - [`error`] - pipeline error types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parallel_jobs::config::RunnerConfig;
//! use parallel_jobs::execution::{BatchExecutor, ProcessRunner};
//! use parallel_jobs::job::JobRecord;
//! use parallel_jobs::reporting::ConsoleReporter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let jobs = vec![
//!     JobRecord::parse(1, "sleep 1")?,
//!     JobRecord::parse(2, "echo done")?,
//! ];
//!
//! let executor = BatchExecutor::new(RunnerConfig::new(2), ProcessRunner::new());
//! let report = executor.run(jobs, &mut ConsoleReporter::stdout()).await?;
//! println!("{} succeeded", report.succeeded());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod execution;
pub mod job;
pub mod logging;
pub mod reporting;

pub use config::{ConfigLoader, FailFastPolicy, MalformedLinePolicy, RunnerConfig};
pub use error::{JobRunError, Result};
pub use execution::{BatchExecutor, BatchReport, BatchStatus, CommandRunner, ProcessRunner};
pub use job::{tokenize, CommandLine, JobFailure, JobRecord, JobStatus};
