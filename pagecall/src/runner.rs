use log::{debug, error, info, warn};

use crate::config::RunnerConfig;
use crate::scenario::{Cmd, Scenario, Test};
use crate::session::{status_of, Session};

/// Outcome of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub name: String,
    /// Commands of the test body that were executed.
    pub executed: usize,
    /// One line per failing command.
    pub failures: Vec<String>,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub tests: Vec<TestReport>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.tests.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run every test of `scenario`, or only those named in `filter` when it
    /// is not empty. Naming a test with input groups selects all its sub-tests.
    pub fn run(&self, scenario: &Scenario, filter: &[String]) -> Report {
        if scenario.tests.is_empty() {
            info!("no test cases found, nothing to do");
        }

        let tests = scenario
            .tests
            .iter()
            .filter(|t| {
                filter.is_empty() || filter.iter().any(|f| *f == t.name || f == t.base_name())
            });
        let report = Report {
            tests: tests.map(|t| self.run_test(scenario, t)).collect(),
        };

        info!(
            "{} tests: {} passed, {} failed",
            report.tests.len(),
            report.passed(),
            report.failed()
        );
        report
    }

    pub fn run_test(&self, scenario: &Scenario, test: &Test) -> TestReport {
        info!("start executing test case {}", test.name);
        let mut session = Session::new(self.config.page_capacity);
        let env = scenario.env_for(test);
        let break_if_fail = test.break_if_fail.unwrap_or(self.config.break_if_fail);

        if let Some(env) = env {
            debug!("applying env {} init", env.name);
            for cmd in &env.init {
                if let Err(msg) = run_cmd(&mut session, cmd) {
                    warn!("env {} init: {}", env.name, msg);
                }
            }
        }

        let mut report = TestReport { name: test.name.clone(), executed: 0, failures: Vec::new() };
        for cmd in &test.cmds {
            report.executed += 1;
            if let Err(msg) = run_cmd(&mut session, cmd) {
                error!("{}", msg);
                report.failures.push(msg);
                if break_if_fail {
                    break;
                }
            }
        }

        if let Some(env) = env {
            debug!("applying env {} exit", env.name);
            for cmd in &env.exit {
                if let Err(msg) = run_cmd(&mut session, cmd) {
                    warn!("env {} exit: {}", env.name, msg);
                }
            }
        }

        if report.passed() {
            info!("run test case {} succeeded", test.name);
        } else {
            error!("run test case {} failed", test.name);
        }
        report
    }
}

/// Execute `cmd` and check its expectation.
fn run_cmd(session: &mut Session, cmd: &Cmd) -> Result<(), String> {
    let result = session
        .execute(cmd)
        .map_err(|e| format!("cmd {}{:?} is malformed: {:#}", cmd.opfunc, cmd.args, e))?;
    let status = status_of(&result);

    let message = format!(
        "execute cmd: {}{:?}, expect return value {}, actual: {}",
        cmd.opfunc, cmd.args, cmd.condition, status
    );
    if cmd.condition.holds(status) {
        debug!("{} succeeded", message);
        Ok(())
    } else {
        Err(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfigBuilder;
    use pretty_assertions::assert_eq;

    const TEXT: &str = r#"
        [[tests]]
        name = "stops"
        cmds = [
            { opfunc = "release", args = ["mem_idx=1"], expect_eq = 0 },
            { opfunc = "allocate", args = ["size=8", "out_idx=1"], expect_eq = 0 },
        ]

        [[tests]]
        name = "continues"
        break_if_fail = false
        cmds = [
            { opfunc = "release", args = ["mem_idx=1"], expect_eq = 0 },
            { opfunc = "release", args = ["mem_idx=2"], expect_eq = 0 },
            { opfunc = "release", args = ["mem_idx=3"], expect_eq = "NullHandle" },
        ]
    "#;

    #[test]
    fn break_if_fail_controls_execution() {
        let scenario = Scenario::parse(TEXT).unwrap();
        let report = Runner::new(RunnerConfig::default()).run(&scenario, &[]);

        assert_eq!(report.tests[0].executed, 1);
        assert_eq!(report.tests[0].failures.len(), 1);
        assert_eq!(report.tests[1].executed, 3);
        assert_eq!(report.tests[1].failures.len(), 2);
        assert_eq!(report.failed(), 2);
        assert!(!report.all_passed());
    }

    #[test]
    fn config_default_applies_when_test_is_silent() {
        let scenario = Scenario::parse(TEXT).unwrap();
        let config = RunnerConfigBuilder::new().with_break_if_fail(false).get();
        let report = Runner::new(config).run(&scenario, &["stops".to_string()]);

        assert_eq!(report.tests.len(), 1);
        assert_eq!(report.tests[0].executed, 2);
        assert_eq!(report.tests[0].failures.len(), 1);
    }

    #[test]
    fn sessions_are_isolated() {
        let text = r#"
            [[tests]]
            name = "first"
            cmds = [{ opfunc = "allocate", args = ["size=8", "out_idx=1"], expect_eq = 0 }]

            [[tests]]
            name = "second"
            cmds = [{ opfunc = "release", args = ["mem_idx=1"], expect_eq = "NullHandle" }]
        "#;
        let scenario = Scenario::parse(text).unwrap();
        let report = Runner::new(RunnerConfig::default()).run(&scenario, &[]);
        assert!(report.all_passed());
    }

    #[test]
    fn env_wraps_its_tests() {
        let text = r#"
            [[envs]]
            name = "block"
            tests = ["uses_block"]
            init = [{ opfunc = "allocate", args = ["size=8", "out_idx=4"], expect_eq = 0 }]
            exit = [{ opfunc = "release", args = ["mem_idx=4"], expect_eq = 0 }]

            [[tests]]
            name = "uses_block"
            cmds = [
                { opfunc = "write64", args = ["mem_idx=4", "offset=0", "val=11"], expect_eq = 0 },
                { opfunc = "read64", args = ["mem_idx=4", "offset=0"], expect_eq = 11 },
            ]

            [[tests]]
            name = "no_block"
            cmds = [{ opfunc = "read64", args = ["mem_idx=4", "offset=0"], expect_eq = "NullHandle" }]
        "#;
        let scenario = Scenario::parse(text).unwrap();
        let report = Runner::new(RunnerConfig::default()).run(&scenario, &[]);
        assert!(report.all_passed(), "{:?}", report);
    }

    #[test]
    fn input_groups_run_as_sub_tests() {
        let text = r#"
            [[envs]]
            name = "block"
            tests = ["sweep"]
            init = [{ opfunc = "allocate", args = ["size=32", "out_idx=1"], expect_eq = 0 }]
            exit = [{ opfunc = "release", args = ["mem_idx=1"], expect_eq = 0 }]

            [[tests]]
            name = "sweep"
            cmds = [
                { opfunc = "write32", args = ["mem_idx=1", "offset=$off", "val=$val"], expect_eq = 0 },
                { opfunc = "read32", args = ["mem_idx=1", "offset=$off"], expect_eq = "$want" },
                { opfunc = "write32", args = ["mem_idx=1", "offset=$off", "val=0"], expect_eq = 0 },
            ]

            [[tests.inputs]]
            name = "ok"
            args = { off = { start = 0, end = 8, step = 4 }, val = -5, want = -5 }

            [[tests.inputs]]
            name = "wrong"
            break_if_fail = false
            args = { off = 0, val = 3, want = 4 }

            [[tests]]
            name = "other"
            cmds = []
        "#;
        let scenario = Scenario::parse(text).unwrap();
        let report = Runner::new(RunnerConfig::default()).run(&scenario, &["sweep".to_string()]);
        let names: Vec<&str> = report.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["sweep_ok_off=0", "sweep_ok_off=4", "sweep_ok_off=8", "sweep_wrong"]
        );

        for ok in &report.tests[..3] {
            assert!(ok.passed(), "{:?}", ok);
            assert_eq!(ok.executed, 3);
        }
        // group-level break_if_fail = false keeps going past the failure
        assert_eq!(report.tests[3].executed, 3);
        assert_eq!(report.tests[3].failures.len(), 1);
    }

    #[test]
    fn malformed_command_fails_the_test() {
        let text = r#"
            [[tests]]
            name = "bad"
            cmds = [{ opfunc = "release", args = ["mem_idx=one"], expect_eq = 0 }]
        "#;
        let scenario = Scenario::parse(text).unwrap();
        let report = Runner::new(RunnerConfig::default()).run(&scenario, &[]);
        assert!(report.tests[0].failures[0].contains("malformed"));
    }
}
