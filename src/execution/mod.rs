//! Job execution pipeline: queue, runner, worker pool, collector and the
//! batch executor that ties them together.

pub mod batch;
pub mod collector;
pub mod queue;
pub mod runner;
pub mod worker_pool;

pub use batch::BatchExecutor;
pub use collector::{BatchReport, BatchStatus, ResultCollector};
pub use queue::JobQueue;
pub use runner::{CommandRunner, ProcessRunner};
pub use worker_pool::{WorkerPool, WorkerPoolError, WorkerPoolStats, WorkerState};
