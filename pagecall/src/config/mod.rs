pub mod logger_config;
pub mod runner_config;

pub use logger_config::LoggerConfig;
pub use runner_config::{RunnerConfig, RunnerConfigBuilder, RunnerConfigReader};
