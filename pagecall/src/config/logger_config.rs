use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Logger configuration used by the runner.
///
/// `app_level_filter` applies to the runner and the adapter, `level_filter`
/// to everything else. `RUST_LOG` still overrides both.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub app_level_filter: LevelFilter,
    pub level_filter: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { app_level_filter: LevelFilter::Info, level_filter: LevelFilter::Warn }
    }
}

impl LoggerConfig {
    /// Install the global logger. Fails if one is already installed.
    pub fn init(&self) -> Result<(), log::SetLoggerError> {
        env_logger::Builder::new()
            .filter_level(self.level_filter)
            .filter_module("pagecall", self.app_level_filter)
            .filter_module("pagecall_core", self.app_level_filter)
            .parse_default_env()
            .try_init()
    }
}
