//! # Job Source
//!
//! Reads a job file and turns its lines into pending [`JobRecord`]s, in file
//! order.
//!
//! Reading stops, keeping everything read so far, at the first read error
//! (including invalid UTF-8) or at the first line whose length reaches
//! [`MAX_LINE_BYTES`]. Zero-length lines are skipped. Lines that contain text
//! but no command are handled according to [`MalformedLinePolicy`].

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

use super::record::JobRecord;
use crate::config::MalformedLinePolicy;
use crate::constants::limits::MAX_LINE_BYTES;
use crate::error::{JobRunError, Result};

/// A raw line together with its 1-based position in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line_number: usize,
    pub text: String,
}

/// Open `path` and build the job list from it
pub async fn load_job_file(path: &Path, policy: MalformedLinePolicy) -> Result<Vec<JobRecord>> {
    let file = File::open(path)
        .await
        .map_err(|e| JobRunError::job_file_unreadable(path.display().to_string(), e))?;

    let lines = read_lines(BufReader::new(file)).await;
    let jobs = build_jobs(lines, policy)?;

    info!(
        path = %path.display(),
        job_count = jobs.len(),
        "Job file loaded"
    );

    Ok(jobs)
}

/// Read raw lines until end of input, a read error or an over-long line
///
/// At most `MAX_LINE_BYTES + 1` bytes are buffered per line, so neither a
/// huge line nor newline-free input is ever held in memory whole.
pub async fn read_lines<R: AsyncBufRead + Unpin>(mut reader: R) -> Vec<SourceLine> {
    let mut collected = Vec::new();
    let mut line_number = 0;
    let mut buf = Vec::with_capacity(MAX_LINE_BYTES + 1);

    loop {
        line_number += 1;
        buf.clear();

        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await;

        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                warn!(
                    line_number,
                    error = %error,
                    "Failed to read job line, ignoring the rest of the file"
                );
                break;
            }
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        if buf.len() >= MAX_LINE_BYTES {
            warn!(
                line_number,
                limit = MAX_LINE_BYTES,
                "Job line exceeds read limit, ignoring it and the rest of the file"
            );
            break;
        }

        match String::from_utf8(std::mem::take(&mut buf)) {
            Ok(text) => collected.push(SourceLine { line_number, text }),
            Err(error) => {
                warn!(
                    line_number,
                    error = %error,
                    "Job line is not valid UTF-8, ignoring the rest of the file"
                );
                break;
            }
        }
    }

    collected
}

/// Tokenize every line into a pending record, numbering jobs from 1
pub fn build_jobs(lines: Vec<SourceLine>, policy: MalformedLinePolicy) -> Result<Vec<JobRecord>> {
    let mut jobs = Vec::with_capacity(lines.len());

    for SourceLine { line_number, text } in lines {
        if text.is_empty() {
            debug!(line_number, "Skipping empty job line");
            continue;
        }

        match JobRecord::parse(jobs.len() + 1, text.as_str()) {
            Ok(job) => jobs.push(job),
            Err(error) => match policy {
                MalformedLinePolicy::Fail => {
                    return Err(JobRunError::malformed_line(line_number, text));
                }
                MalformedLinePolicy::Skip => {
                    warn!(
                        line_number,
                        raw = %text,
                        error = %error,
                        "Skipping malformed job line"
                    );
                }
            },
        }
    }

    Ok(jobs)
}
