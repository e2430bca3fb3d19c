//! pjobs Binary
//!
//! Runs every command of a job file across a fixed pool of workers and
//! prints one progress line per submission and per completion.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use tracing::info;

use parallel_jobs::config::{
    ConfigLoader, ConfigurationError, FailFastPolicy, MalformedLinePolicy, RunnerConfig,
};
use parallel_jobs::constants::exit_codes;
use parallel_jobs::execution::{BatchExecutor, BatchReport, ProcessRunner};
use parallel_jobs::job::load_job_file;
use parallel_jobs::logging::init_structured_logging;
use parallel_jobs::reporting::{ConsoleReporter, ProgressReporter};
use parallel_jobs::JobRunError;

#[derive(Parser, Debug)]
#[command(name = "pjobs")]
#[command(version)]
#[command(about = "Run the commands of a job file across a fixed pool of workers")]
struct Args {
    /// File with one command per line
    job_file: PathBuf,

    /// Number of concurrent workers (positive integer)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    workers: u64,

    /// Abort the whole run on the first failed job
    #[arg(long)]
    fail_fast: bool,

    /// What to do with lines that contain no command
    #[arg(long, value_enum)]
    on_malformed: Option<MalformedArg>,

    /// Result channel capacity (defaults to the worker count)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    result_buffer: Option<u64>,

    /// Show the output of the commands instead of discarding it
    #[arg(long)]
    inherit_output: bool,

    /// Optional TOML configuration file (also read from PJOBS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MalformedArg {
    /// Reject the job file
    Fail,
    /// Skip the line with a warning
    Skip,
}

impl From<MalformedArg> for MalformedLinePolicy {
    fn from(arg: MalformedArg) -> Self {
        match arg {
            MalformedArg::Fail => MalformedLinePolicy::Fail,
            MalformedArg::Skip => MalformedLinePolicy::Skip,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
                _ => exit_codes::CONFIGURATION_ERROR,
            };
            // Printing help/usage can only fail if the terminal is gone
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_structured_logging();

    match run(args).await {
        Ok(report) => {
            info!(
                exit_code = report.exit_code(),
                aborted = report.is_aborted(),
                "pjobs finished"
            );
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn run(args: Args) -> anyhow::Result<BatchReport> {
    let config = load_config(&args).context("Invalid configuration")?;

    let jobs = load_job_file(&args.job_file, config.on_malformed).await?;

    let mut reporter = ConsoleReporter::stdout();
    reporter.run_started(&args.job_file.display().to_string(), &config, jobs.len());

    let runner = ProcessRunner::from_config(&config);
    let executor = BatchExecutor::new(config, runner);
    let report = executor.run(jobs, &mut reporter).await?;

    Ok(report)
}

fn load_config(args: &Args) -> Result<RunnerConfig, ConfigurationError> {
    let worker_count = usize::try_from(args.workers).map_err(|_| {
        ConfigurationError::invalid_value(
            "workers",
            args.workers.to_string(),
            "exceeds the platform's maximum",
        )
    })?;

    let mut loader = match &args.config {
        Some(path) => ConfigLoader::new().with_config_file(path),
        None => ConfigLoader::new().with_config_file_from_env(),
    }
    .with_worker_count(worker_count);

    // Flags only ever switch behaviour on; absent flags leave file/env values alone
    if args.fail_fast {
        loader = loader.with_fail_fast(FailFastPolicy::Enabled);
    }
    if args.inherit_output {
        loader = loader.with_inherit_output(true);
    }
    if let Some(policy) = args.on_malformed {
        loader = loader.with_malformed_policy(policy.into());
    }
    if let Some(buffer) = args.result_buffer {
        let buffer = usize::try_from(buffer).map_err(|_| {
            ConfigurationError::invalid_value(
                "result_buffer",
                buffer.to_string(),
                "exceeds the platform's maximum",
            )
        })?;
        loader = loader.with_result_buffer(buffer);
    }

    loader.load()
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    if let Some(run_error) = error.downcast_ref::<JobRunError>() {
        if !run_error.is_configuration_error() {
            return exit_codes::INTERNAL_ERROR;
        }
    }
    exit_codes::CONFIGURATION_ERROR
}
