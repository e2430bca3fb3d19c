//! # Job Record
//!
//! The unit of work and of result. A record is created once when its line is
//! parsed, completed exactly once by the worker that runs it, and afterwards
//! only read by the collector.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use super::tokenizer::{tokenize, CommandLine, TokenizeError};
use crate::error::{JobRunError, Result};

/// Why a job did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobFailure {
    /// The process ran and exited unsuccessfully; `None` when killed by a signal
    #[error("{}", describe_exit(.code))]
    NonZeroExit { code: Option<i32> },

    /// The process could not be started at all
    #[error("failed to start: {reason}")]
    SpawnFailed { reason: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl JobFailure {
    pub fn spawn_failed<E: fmt::Display>(error: E) -> Self {
        Self::SpawnFailed {
            reason: error.to_string(),
        }
    }
}

/// Lifecycle state of a job
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Succeeded,
    Failed(JobFailure),
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One command from the job file and, once run, its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    id: Uuid,
    sequence: usize,
    raw_text: String,
    command: CommandLine,
    status: JobStatus,
    elapsed: Option<Duration>,
}

impl JobRecord {
    /// Build a pending record from an already parsed command
    pub fn new<S: Into<String>>(sequence: usize, raw_text: S, command: CommandLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            raw_text: raw_text.into(),
            command,
            status: JobStatus::Pending,
            elapsed: None,
        }
    }

    /// Tokenize `raw_text` and build a pending record from it
    pub fn parse<S: Into<String>>(
        sequence: usize,
        raw_text: S,
    ) -> std::result::Result<Self, TokenizeError> {
        let raw_text = raw_text.into();
        let command = tokenize(&raw_text)?;
        Ok(Self::new(sequence, raw_text, command))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 1-based position among submitted jobs
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, JobStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded)
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match &self.status {
            JobStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Wall-clock seconds of the attempt; 0.0 while pending
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.map(|d| d.as_secs_f64()).unwrap_or(0.0)
    }

    /// Attach the outcome of the single execution attempt
    pub fn complete(
        &mut self,
        outcome: std::result::Result<(), JobFailure>,
        elapsed: Duration,
    ) -> Result<()> {
        if !self.is_pending() {
            return Err(JobRunError::AlreadyCompleted {
                sequence: self.sequence,
                raw: self.raw_text.clone(),
            });
        }

        self.status = match outcome {
            Ok(()) => JobStatus::Succeeded,
            Err(failure) => JobStatus::Failed(failure),
        };
        self.elapsed = Some(elapsed);
        Ok(())
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}
