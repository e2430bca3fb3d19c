//! Configuration Loader
//!
//! Layers configuration sources with the `config` crate. Later sources win:
//!
//! 1. built-in defaults ([`RunnerConfig::default`])
//! 2. an optional TOML file (`--config` or `PJOBS_CONFIG`)
//! 3. `PJOBS_*` environment variables (`PJOBS_FAIL_FAST=enabled`)
//! 4. explicit overrides, normally taken from the command line

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use super::error::{ConfigResult, ConfigurationError};
use super::{FailFastPolicy, MalformedLinePolicy, RunnerConfig};
use crate::constants::env_vars;

/// Explicit values that take precedence over every other source
#[derive(Debug, Clone, Default)]
struct Overrides {
    worker_count: Option<usize>,
    fail_fast: Option<FailFastPolicy>,
    on_malformed: Option<MalformedLinePolicy>,
    result_buffer: Option<usize>,
    inherit_output: Option<bool>,
}

/// Builder that assembles a validated [`RunnerConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_file: Option<PathBuf>,
    /// Replaces the process environment when set; used by tests
    environment: Option<HashMap<String, String>>,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an additional TOML file; it must exist
    pub fn with_config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use the file named by `PJOBS_CONFIG` when no file was given explicitly
    pub fn with_config_file_from_env(mut self) -> Self {
        if self.config_file.is_none() {
            self.config_file = self
                .env_value(env_vars::CONFIG_FILE)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from);
        }
        self
    }

    /// Read `PJOBS_*` variables from this map instead of the process environment
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.overrides.worker_count = Some(worker_count);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: FailFastPolicy) -> Self {
        self.overrides.fail_fast = Some(fail_fast);
        self
    }

    pub fn with_malformed_policy(mut self, on_malformed: MalformedLinePolicy) -> Self {
        self.overrides.on_malformed = Some(on_malformed);
        self
    }

    pub fn with_result_buffer(mut self, result_buffer: usize) -> Self {
        self.overrides.result_buffer = Some(result_buffer);
        self
    }

    pub fn with_inherit_output(mut self, inherit_output: bool) -> Self {
        self.overrides.inherit_output = Some(inherit_output);
        self
    }

    /// Merge all sources, deserialize and validate
    pub fn load(&self) -> ConfigResult<RunnerConfig> {
        let defaults = RunnerConfig::default();

        let mut builder = Config::builder()
            .set_default("worker_count", defaults.worker_count as i64)?
            .set_default("fail_fast", defaults.fail_fast.as_str())?
            .set_default("on_malformed", defaults.on_malformed.as_str())?
            .set_default("inherit_output", defaults.inherit_output)?;

        if let Some(path) = &self.config_file {
            builder = builder.add_source(Self::file_source(path)?);
        }

        builder = builder.add_source(
            Environment::with_prefix(env_vars::CONFIG_PREFIX)
                .try_parsing(true)
                .source(self.environment.clone()),
        );

        let overrides = &self.overrides;
        builder = builder
            .set_override_option("worker_count", overrides.worker_count.map(|v| v as i64))?
            .set_override_option("fail_fast", overrides.fail_fast.map(|v| v.as_str()))?
            .set_override_option("on_malformed", overrides.on_malformed.map(|v| v.as_str()))?
            .set_override_option("result_buffer", overrides.result_buffer.map(|v| v as i64))?
            .set_override_option("inherit_output", overrides.inherit_output)?;

        let config: RunnerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            config = %serde_json::to_string(&config)
                .unwrap_or_else(|_| "[serialization error]".to_string()),
            config_file = ?self.config_file,
            "Runner configuration loaded"
        );

        Ok(config)
    }

    fn file_source(path: &Path) -> ConfigResult<File<config::FileSourceFile, FileFormat>> {
        if !path.is_file() {
            return Err(ConfigurationError::config_file_not_found(path));
        }

        Ok(File::from(path).format(FileFormat::Toml).required(true))
    }

    fn env_value(&self, key: &str) -> Option<String> {
        match &self.environment {
            Some(environment) => environment.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn isolated() -> ConfigLoader {
        ConfigLoader::new().with_environment(HashMap::new())
    }

    #[test]
    fn test_defaults_when_no_sources() {
        let cfg = isolated().load().unwrap();
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let env = HashMap::from([
            ("PJOBS_WORKER_COUNT".to_string(), "6".to_string()),
            ("PJOBS_FAIL_FAST".to_string(), "enabled".to_string()),
            ("PJOBS_RESULT_BUFFER".to_string(), "2".to_string()),
        ]);
        let cfg = ConfigLoader::new().with_environment(env).load().unwrap();
        assert_eq!(cfg.worker_count, 6);
        assert!(cfg.fail_fast.is_enabled());
        assert_eq!(cfg.result_buffer, Some(2));
    }

    #[test]
    fn test_explicit_overrides_beat_environment() {
        let env = HashMap::from([("PJOBS_FAIL_FAST".to_string(), "enabled".to_string())]);
        let cfg = ConfigLoader::new()
            .with_environment(env)
            .with_fail_fast(FailFastPolicy::Disabled)
            .with_worker_count(3)
            .load()
            .unwrap();
        assert_eq!(cfg.worker_count, 3);
        assert_eq!(cfg.fail_fast, FailFastPolicy::Disabled);
    }

    #[test]
    fn test_config_file_is_layered_under_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "worker_count = 5").unwrap();
        writeln!(file, "on_malformed = \"skip\"").unwrap();
        writeln!(file, "inherit_output = true").unwrap();

        let cfg = isolated()
            .with_config_file(file.path())
            .with_worker_count(2)
            .load()
            .unwrap();
        assert_eq!(cfg.worker_count, 2);
        assert_eq!(cfg.on_malformed, MalformedLinePolicy::Skip);
        assert!(cfg.inherit_output);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = isolated()
            .with_config_file("/definitely/not/here/pjobs.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_config_file_from_environment_variable() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "fail_fast = \"enabled\"").unwrap();

        let env = HashMap::from([(
            "PJOBS_CONFIG".to_string(),
            file.path().display().to_string(),
        )]);
        let cfg = ConfigLoader::new()
            .with_environment(env)
            .with_config_file_from_env()
            .load()
            .unwrap();
        assert!(cfg.fail_fast.is_enabled());
    }

    #[test]
    fn test_zero_workers_fail_validation() {
        let err = isolated().with_worker_count(0).load().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_policy_value_is_a_load_error() {
        let env = HashMap::from([("PJOBS_ON_MALFORMED".to_string(), "ignore".to_string())]);
        let err = ConfigLoader::new().with_environment(env).load().unwrap_err();
        assert!(matches!(err, ConfigurationError::LoadError { .. }));
    }
}
