use serde::Deserialize;

use super::Cmd;

/// Setup and teardown shared by a set of tests.
///
/// `init` runs before and `exit` after each listed test, inside that test's
/// session. Their outcomes are logged but do not decide the test.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Env {
    pub name: String,
    #[serde(default)]
    pub init: Vec<Cmd>,
    #[serde(default)]
    pub exit: Vec<Cmd>,
    #[serde(default)]
    pub tests: Vec<String>,
}

impl Env {
    pub fn wraps(&self, test: &str) -> bool {
        self.tests.iter().any(|t| t == test)
    }
}
