//! # Command Runner
//!
//! The process execution facility the worker pool depends on. Workers only
//! see the [`CommandRunner`] trait, so tests can substitute scripted runners
//! for real processes.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::trace;

use crate::config::RunnerConfig;
use crate::job::{CommandLine, JobFailure};

/// Runs one command to completion and reports pass/fail
///
/// Implementations must be cancel-safe in the sense that dropping the
/// returned future abandons the attempt; the worker pool relies on this when
/// a fail-fast abort shuts the pool down.
#[async_trait]
pub trait CommandRunner: Send + Sync + 'static {
    async fn run(&self, command: &CommandLine) -> Result<(), JobFailure>;

    /// Name used in log output
    fn name(&self) -> &str;
}

/// Spawns real child processes with `tokio::process`
///
/// The executable is resolved through the host's standard lookup (`PATH`).
/// Children get a null stdin; their stdout/stderr are discarded unless
/// output inheritance is enabled. Children are killed if the attempt is
/// dropped before they exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    inherit_output: bool,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            inherit_output: config.inherit_output,
        }
    }

    fn build(&self, command: &CommandLine) -> Command {
        let mut process = Command::new(&command.executable);
        process
            .args(&command.arguments)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if !self.inherit_output {
            process.stdout(Stdio::null()).stderr(Stdio::null());
        }

        process
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandLine) -> Result<(), JobFailure> {
        trace!(command = %command, "Spawning child process");

        let status = self
            .build(command)
            .status()
            .await
            .map_err(JobFailure::spawn_failed)?;

        if status.success() {
            Ok(())
        } else {
            Err(JobFailure::NonZeroExit {
                code: status.code(),
            })
        }
    }

    fn name(&self) -> &str {
        "process"
    }
}
