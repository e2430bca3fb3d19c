//! # Job Queue
//!
//! A bounded channel of pending jobs, sized to the batch so populating it
//! never blocks. The sender is dropped once every job is enqueued, which lets
//! workers tell "drained" apart from "empty for now".
//!
//! Workers share the single receiver behind an async mutex; each `recv`
//! hands a job to exactly one worker.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::constants::limits::MIN_CHANNEL_CAPACITY;
use crate::error::{JobRunError, Result};
use crate::job::JobRecord;

/// Shared consumer side of the job queue
#[derive(Debug, Clone)]
pub struct JobQueue {
    receiver: Arc<Mutex<mpsc::Receiver<JobRecord>>>,
    capacity: usize,
}

impl JobQueue {
    /// Enqueue every job, then close the producer side
    pub fn populate(jobs: Vec<JobRecord>) -> Result<Self> {
        let capacity = jobs.len().max(MIN_CHANNEL_CAPACITY);
        let (sender, receiver) = mpsc::channel(capacity);

        for job in jobs {
            sender.try_send(job).map_err(|error| {
                let reason = error.to_string();
                let job = error.into_inner();
                JobRunError::QueueRejected {
                    sequence: job.sequence(),
                    raw: job.raw_text().to_string(),
                    reason,
                }
            })?;
        }

        debug!(capacity, "Job queue populated and closed");

        Ok(Self {
            receiver: Arc::new(Mutex::new(receiver)),
            capacity,
        })
    }

    /// Claim the next job; `None` once the queue is drained
    pub async fn next(&self) -> Option<JobRecord> {
        self.receiver.lock().await.recv().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
