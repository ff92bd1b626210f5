//! Scenario runner for `pagecall-core`.
//!
//! Loads TOML scenarios, runs each test in a fresh session against the
//! built-in operation catalog and reports which expectations held.

pub mod config;
pub mod runner;
pub mod scenario;
pub mod session;

pub use runner::{Report, Runner, TestReport};
pub use scenario::Scenario;
pub use session::Session;
