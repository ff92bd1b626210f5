use std::path::Path;

use anyhow::Result;
use pretty_assertions::assert_eq;

use pagecall::config::RunnerConfig;
use pagecall::{Runner, Scenario};

fn sample() -> Result<Scenario> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/sample.toml");
    Scenario::load(&path)
}

#[cfg(unix)]
#[test]
fn sample_scenario_passes() -> Result<()> {
    let scenario = sample()?;
    let report = Runner::new(RunnerConfig::default()).run(&scenario, &[]);

    let names: Vec<String> = report.tests.iter().map(|t| t.name.clone()).collect();
    let mut expected: Vec<String> = [
        "heap_round_trip",
        "double_release",
        "fill_copy_compare",
        "string_fill_tiles",
        "check_precedence",
        "mapping_lifecycle",
        "descriptor_lifecycle",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for off in [0, 8, 16, 24] {
        for val in [7, -1] {
            expected.push(format!("offset_sweep_aligned_off={off}_val={val}"));
        }
    }
    assert_eq!(names, expected);
    for test in &report.tests {
        assert!(test.passed(), "{}: {:?}", test.name, test.failures);
        assert_eq!(test.executed, scenario.test(&test.name).map_or(0, |t| t.cmds.len()));
    }
    Ok(())
}

#[test]
fn filter_selects_tests() -> Result<()> {
    let scenario = sample()?;
    let filter = vec!["double_release".to_string()];
    let report = Runner::new(RunnerConfig::default()).run(&scenario, &filter);
    assert_eq!(report.tests.len(), 1);
    assert!(report.all_passed());
    Ok(())
}

#[test]
fn filter_selects_expanded_tests_by_base_name() -> Result<()> {
    let scenario = sample()?;
    let filter = vec!["offset_sweep".to_string()];
    let report = Runner::new(RunnerConfig::default()).run(&scenario, &filter);
    assert_eq!(report.tests.len(), 8);
    assert!(report.all_passed(), "{:?}", report);
    Ok(())
}

#[test]
fn missing_file_names_the_path() {
    let err = Scenario::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/scenario.toml"));
}
