//! Scenario files.
//!
//! A scenario is a TOML document of named tests, each a list of operation
//! calls with an expected outcome, plus optional environments that wrap
//! tests with setup and teardown commands. Tests with input groups are
//! expanded into their sub-tests when the file is parsed.

mod cmd;
mod condition;
mod env;
mod input;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

pub use cmd::{quoted, Cmd};
pub use condition::Condition;
pub use env::Env;
pub use input::{ArgValue, InputGroup, Scalar};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Test {
    pub name: String,
    pub cmds: Vec<Cmd>,
    /// Stop at the first failing command. Falls back to the runner default.
    #[serde(default)]
    pub break_if_fail: Option<bool>,
    #[serde(default)]
    pub inputs: Vec<InputGroup>,
    /// Name of the test this one was expanded from.
    #[serde(skip)]
    pub origin: Option<String>,
}

impl Test {
    /// The name as written in the scenario file.
    pub fn base_name(&self) -> &str {
        self.origin.as_deref().unwrap_or(&self.name)
    }

    /// One sub-test per input combination, or the test itself when it has
    /// no input groups.
    pub fn expand(self) -> Result<Vec<Test>> {
        if self.inputs.is_empty() {
            return Ok(vec![self]);
        }

        let mut expanded = Vec::new();
        for (n, group) in self.inputs.iter().enumerate() {
            let group_name = group.name.clone().unwrap_or_else(|| format!("input{}", n + 1));
            for binding in group.bindings().with_context(|| format!("test '{}'", self.name))? {
                let cmds = self
                    .cmds
                    .iter()
                    .map(|cmd| -> Result<Cmd> {
                        let condition = cmd.condition.substitute(&binding.vars).map_err(|e| {
                            anyhow!("test '{}' group '{}': {}", self.name, group_name, e)
                        })?;
                        Ok(Cmd {
                            opfunc: cmd.opfunc.clone(),
                            condition,
                            args: cmd
                                .args
                                .iter()
                                .map(|arg| input::replace_vars(arg, &binding.vars))
                                .collect(),
                            perf: cmd.perf,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                expanded.push(Test {
                    name: format!("{}_{}{}", self.name, group_name, binding.suffix),
                    cmds,
                    break_if_fail: group.break_if_fail.or(self.break_if_fail),
                    inputs: Vec::new(),
                    origin: Some(self.name.clone()),
                });
            }
        }
        Ok(expanded)
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    #[serde(default)]
    pub tests: Vec<Test>,
    #[serde(default)]
    pub envs: Vec<Env>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: Scenario = toml::from_str(text)?;
        raw.validate()?;

        let mut tests = Vec::with_capacity(raw.tests.len());
        for test in raw.tests {
            tests.extend(test.expand()?);
        }
        let scenario = Scenario { tests, envs: raw.envs };
        scenario.validate_expanded()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for test in &self.tests {
            if !names.insert(test.name.as_str()) {
                bail!("duplicate test name '{}'", test.name);
            }
        }

        let mut wrapped = HashSet::new();
        for env in &self.envs {
            for name in &env.tests {
                if !names.contains(name.as_str()) {
                    bail!("env '{}' refers to unknown test '{}'", env.name, name);
                }
                if !wrapped.insert(name.as_str()) {
                    bail!("test '{}' is wrapped by more than one env", name);
                }
            }
        }
        Ok(())
    }

    fn validate_expanded(&self) -> Result<()> {
        let mut names = HashSet::new();
        for test in &self.tests {
            if !names.insert(test.name.as_str()) {
                bail!("expanded test name '{}' collides with another test", test.name);
            }
            let pending = test
                .cmds
                .iter()
                .find(|c| matches!(c.condition, Condition::Pending { .. }));
            if let Some(cmd) = pending {
                bail!(
                    "test '{}': expectation of {} names a variable no input group defines",
                    test.name,
                    cmd.opfunc
                );
            }
        }
        Ok(())
    }

    /// The environment wrapping `test`, if any. Sub-tests share the env of
    /// the test they were expanded from.
    pub fn env_for(&self, test: &Test) -> Option<&Env> {
        self.envs.iter().find(|env| env.wraps(test.base_name()))
    }

    pub fn test(&self, name: &str) -> Option<&Test> {
        self.tests.iter().find(|t| t.name == name)
    }
}
