use thiserror::Error;

use crate::config::ConfigurationError;
use crate::execution::worker_pool::WorkerPoolError;

/// Errors raised by the job pipeline itself.
///
/// Per-job execution failures are not errors at this level: they are recorded
/// on the [`JobRecord`](crate::job::JobRecord) as a
/// [`JobFailure`](crate::job::JobFailure) and reported by the collector.
#[derive(Debug, Error)]
pub enum JobRunError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    WorkerPool(#[from] WorkerPoolError),

    #[error("Malformed job on line {line_number}: '{raw}' contains no command")]
    MalformedLine { line_number: usize, raw: String },

    #[error("Failed to read job file '{path}': {error}")]
    JobFileUnreadable { path: String, error: String },

    #[error("Job queue rejected job {sequence} ('{raw}'): {reason}")]
    QueueRejected {
        sequence: usize,
        raw: String,
        reason: String,
    },

    #[error("Result channel closed after {received} of {expected} results")]
    ResultChannelClosed { received: usize, expected: usize },

    #[error("Job {sequence} ('{raw}') was already completed")]
    AlreadyCompleted { sequence: usize, raw: String },
}

impl JobRunError {
    /// Create a malformed line error
    pub fn malformed_line<S: Into<String>>(line_number: usize, raw: S) -> Self {
        Self::MalformedLine {
            line_number,
            raw: raw.into(),
        }
    }

    /// Create a job file read error
    pub fn job_file_unreadable<P: Into<String>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::JobFileUnreadable {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Whether this error belongs to the configuration class (exit code 1)
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::MalformedLine { .. } | Self::JobFileUnreadable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, JobRunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_display_includes_raw_text() {
        let err = JobRunError::malformed_line(3, "  \"\"  ");
        assert_eq!(
            err.to_string(),
            "Malformed job on line 3: '  \"\"  ' contains no command"
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_channel_closed_is_not_configuration_error() {
        let err = JobRunError::ResultChannelClosed {
            received: 2,
            expected: 5,
        };
        assert!(!err.is_configuration_error());
        assert!(err.to_string().contains("2 of 5"));
    }

    #[test]
    fn test_configuration_error_converts() {
        let err: JobRunError =
            ConfigurationError::invalid_value("worker_count", "0", "must be positive").into();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("worker_count"));
    }
}
