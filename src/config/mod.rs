//! # Runner Configuration
//!
//! Everything that shapes one batch run: pool size, fail-fast behaviour,
//! malformed line handling and channel sizing. Values are layered by
//! [`ConfigLoader`] from built-in defaults, an optional TOML file, `PJOBS_*`
//! environment variables and command line overrides, in that order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use parallel_jobs::config::{ConfigLoader, FailFastPolicy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_worker_count(4)
//!     .with_fail_fast(FailFastPolicy::Enabled)
//!     .load()?;
//!
//! assert_eq!(config.worker_count, 4);
//! assert_eq!(config.effective_result_buffer(), 4);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::limits::MIN_CHANNEL_CAPACITY;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// What the collector does when a job fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailFastPolicy {
    /// Abort the whole run on the first failed job
    Enabled,
    /// Keep collecting until every job has reported
    #[default]
    Disabled,
}

impl FailFastPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, FailFastPolicy::Enabled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailFastPolicy::Enabled => "enabled",
            FailFastPolicy::Disabled => "disabled",
        }
    }
}

impl fmt::Display for FailFastPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How job lines that contain no command are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// Reject the whole job file before anything is enqueued
    #[default]
    Fail,
    /// Drop the line with a warning and continue
    Skip,
}

impl MalformedLinePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MalformedLinePolicy::Fail => "fail",
            MalformedLinePolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for MalformedLinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of concurrent workers, fixed for the run
    pub worker_count: usize,

    /// Abort on first failure or run to completion
    #[serde(default)]
    pub fail_fast: FailFastPolicy,

    /// Treatment of lines that tokenize to nothing
    #[serde(default)]
    pub on_malformed: MalformedLinePolicy,

    /// Result channel capacity; defaults to the worker count
    #[serde(default)]
    pub result_buffer: Option<usize>,

    /// Let children write to this process's stdout/stderr instead of discarding
    #[serde(default)]
    pub inherit_output: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            worker_count: 1,
            fail_fast: FailFastPolicy::default(),
            on_malformed: MalformedLinePolicy::default(),
            result_buffer: None,
            inherit_output: false,
        }
    }
}

impl RunnerConfig {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Default::default()
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: FailFastPolicy) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_malformed_policy(mut self, on_malformed: MalformedLinePolicy) -> Self {
        self.on_malformed = on_malformed;
        self
    }

    pub fn with_result_buffer(mut self, result_buffer: usize) -> Self {
        self.result_buffer = Some(result_buffer);
        self
    }

    /// Capacity of the result channel: explicit value or one slot per worker
    pub fn effective_result_buffer(&self) -> usize {
        self.result_buffer
            .unwrap_or(self.worker_count)
            .max(MIN_CHANNEL_CAPACITY)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker_count",
                "0",
                "at least one worker is required",
            ));
        }

        if self.result_buffer == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "result_buffer",
                "0",
                "result channel needs a capacity of at least 1",
            ));
        }

        Ok(())
    }
}
