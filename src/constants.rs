//! # Constants
//!
//! Process exit codes, read limits and environment variable names shared by
//! the library and the `pjobs` binary.

/// Process exit codes
pub mod exit_codes {
    /// Every job was collected (individual jobs may still have failed)
    pub const SUCCESS: u8 = 0;

    /// Usage, configuration or malformed job file errors
    pub const CONFIGURATION_ERROR: u8 = 1;

    /// Run aborted on the first failed job in fail-fast mode
    pub const FAIL_FAST: u8 = 2;

    /// Internal pipeline failure (workers lost before all results arrived)
    pub const INTERNAL_ERROR: u8 = 3;
}

/// Job file reading limits
pub mod limits {
    /// Lines whose length meets or exceeds this stop job file reading
    pub const MAX_LINE_BYTES: usize = 4096;

    /// Smallest capacity a tokio channel accepts
    pub const MIN_CHANNEL_CAPACITY: usize = 1;
}

/// Environment variables consulted at startup
pub mod env_vars {
    /// Prefix for configuration overrides (`PJOBS_FAIL_FAST=enabled`, ...)
    pub const CONFIG_PREFIX: &str = "PJOBS";

    /// Path to an optional TOML configuration file
    pub const CONFIG_FILE: &str = "PJOBS_CONFIG";

    /// Runtime environment name used to pick a default log level
    pub const ENVIRONMENT: &str = "PJOBS_ENV";

    /// Explicit log filter directive
    pub const LOG_FILTER: &str = "PJOBS_LOG";

    /// Log output format (`pretty` or `json`)
    pub const LOG_FORMAT: &str = "PJOBS_LOG_FORMAT";
}
