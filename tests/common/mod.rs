#![allow(dead_code)]

pub mod runners;
pub mod strategies;

pub use runners::*;
pub use strategies::*;

use std::io::Write;

use parallel_jobs::job::JobRecord;
use parallel_jobs::reporting::ProgressReporter;
use tempfile::NamedTempFile;

/// Write `contents` verbatim to a fresh temporary job file
pub fn job_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp job file");
    file.write_all(contents.as_bytes())
        .expect("write temp job file");
    file.flush().expect("flush temp job file");
    file
}

/// Parse each line into a job, numbering from 1
pub fn parse_jobs(lines: &[&str]) -> Vec<JobRecord> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| JobRecord::parse(i + 1, *line).expect("valid job line"))
        .collect()
}

/// Reporter that remembers every callback for later assertions
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub submitted: Vec<(usize, usize, String)>,
    pub completed: Vec<(usize, usize, String, bool)>,
    pub completion_started: bool,
    pub finished: bool,
}

impl ProgressReporter for RecordingReporter {
    fn job_submitted(&mut self, index: usize, total: usize, job: &JobRecord) {
        self.submitted
            .push((index, total, job.raw_text().to_string()));
    }

    fn completion_started(&mut self, _total: usize) {
        self.completion_started = true;
    }

    fn job_completed(&mut self, index: usize, total: usize, job: &JobRecord) {
        self.completed.push((
            index,
            total,
            job.raw_text().to_string(),
            job.is_success(),
        ));
    }

    fn run_finished(&mut self, _report: &parallel_jobs::BatchReport) {
        self.finished = true;
    }
}
