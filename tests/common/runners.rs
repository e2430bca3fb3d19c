//! In-memory command runners so batch tests don't depend on the host's binaries

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use parallel_jobs::job::{CommandLine, JobFailure};
use parallel_jobs::CommandRunner;

/// Interprets the executable name:
///
/// - `ok` succeeds
/// - `fail` exits with status 1
/// - `missing` fails to start
/// - `sleep <ms>` succeeds after the given delay
///
/// Every run is counted per rendered command line.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    runs: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times each command line ran
    pub fn runs(&self) -> HashMap<String, usize> {
        self.runs.lock().expect("runs lock").clone()
    }

    pub fn total_runs(&self) -> usize {
        self.runs().values().sum()
    }

    /// Highest number of commands observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &CommandLine) -> Result<(), JobFailure> {
        *self
            .runs
            .lock()
            .expect("runs lock")
            .entry(command.to_string())
            .or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let outcome = match command.executable.as_str() {
            "fail" => Err(JobFailure::NonZeroExit { code: Some(1) }),
            "missing" => Err(JobFailure::spawn_failed("No such file or directory")),
            "sleep" => {
                let ms = command
                    .arguments
                    .first()
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
            _ => Ok(()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
