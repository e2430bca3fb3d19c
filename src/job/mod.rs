//! Job parsing: tokenizer, record type and job file source.

pub mod record;
pub mod source;
pub mod tokenizer;

pub use record::{JobFailure, JobRecord, JobStatus};
pub use source::{build_jobs, load_job_file, read_lines, SourceLine};
pub use tokenizer::{tokenize, CommandLine, TokenizeError};
