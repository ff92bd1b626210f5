use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use pagecall::config::{LoggerConfig, RunnerConfigReader};
use pagecall::{Runner, Scenario};
use pagecall_core::resolve::Mode;
use pagecall_core::{OpSpec, Registry};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Runner configuration (TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Log level for the runner and the adapter, e.g. `debug`
    #[clap(long)]
    log: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario file
    Run {
        scenario: PathBuf,
        /// Only run the named tests
        #[clap(short, long)]
        test: Vec<String>,
    },
    /// Print the operation catalog
    List,
}

fn describe(spec: &OpSpec) -> String {
    let params: Vec<String> = spec
        .params
        .iter()
        .map(|p| match p.mode {
            Mode::Value => p.name.to_string(),
            Mode::Absolute => format!("{}:out({})", p.name, p.kind.name()),
            Mode::Relative { non_null: true } => format!("{}:&{}", p.name, p.kind.name()),
            Mode::Relative { non_null: false } => format!("{}:&{}?", p.name, p.kind.name()),
        })
        .collect();
    format!("{:<16} {}  {}", spec.name, spec.arity(), params.join(" "))
}

fn run(args: Args) -> Result<bool> {
    let config = RunnerConfigReader::read_or_default(args.config.as_deref())?;

    let mut logger = config.logger_config.clone().unwrap_or_default();
    if let Some(level) = &args.log {
        logger.app_level_filter = level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("invalid log level '{}'", level))?;
    }
    logger.init()?;

    match args.command {
        Command::List => {
            for spec in Registry::builtin().specs() {
                println!("{}", describe(spec));
            }
            Ok(true)
        }
        Command::Run { scenario, test } => {
            let scenario = Scenario::load(&scenario)?;
            let report = Runner::new(config).run(&scenario, &test);
            for t in &report.tests {
                println!("{} ... {}", t.name, if t.passed() { "ok" } else { "FAILED" });
            }
            println!(
                "\ntest result: {} passed; {} failed",
                report.passed(),
                report.failed()
            );
            Ok(report.all_passed())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
