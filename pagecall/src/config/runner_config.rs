use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pagecall_core::PAGE_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::config::logger_config::LoggerConfig;

/// Runner settings.
/// Please use [`RunnerConfigBuilder`] if you want to build it from code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Slot count of the page each test session gets.
    pub page_capacity: usize,
    /// Whether a test stops at its first failing command, unless the test
    /// says otherwise.
    pub break_if_fail: bool,
    /// Logger configuration to use.
    pub logger_config: Option<LoggerConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            page_capacity: PAGE_CAPACITY,
            break_if_fail: true,
            logger_config: Some(Default::default()),
        }
    }
}

/// `RunnerConfigBuilder` is a convenience builder to create a `RunnerConfig` from code.
#[derive(Default)]
pub struct RunnerConfigBuilder {
    config: RunnerConfig,
}

impl RunnerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_capacity(mut self, page_capacity: usize) -> Self {
        self.config.page_capacity = page_capacity;
        self
    }

    pub fn with_break_if_fail(mut self, break_if_fail: bool) -> Self {
        self.config.break_if_fail = break_if_fail;
        self
    }

    pub fn with_logger_config(mut self, logger_config: LoggerConfig) -> Self {
        self.config.logger_config = Some(logger_config);
        self
    }

    /// Retrieves the configuration built
    pub fn get(self) -> RunnerConfig {
        self.config
    }
}

pub struct RunnerConfigReader;

impl RunnerConfigReader {
    /// Read `path` if given, otherwise fall back to the defaults.
    pub fn read_or_default(path: Option<&Path>) -> Result<RunnerConfig> {
        match path {
            Some(path) => Self::read_runner_toml(path),
            None => Ok(RunnerConfig::default()),
        }
    }

    pub fn read_runner_toml(path: &Path) -> Result<RunnerConfig> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<RunnerConfig> {
        let config: RunnerConfig = toml::from_str(text)?;
        anyhow::ensure!(config.page_capacity > 0, "page_capacity must be positive");
        Ok(config)
    }
}
