//! `taskcheck run` — Run the import-task scenario suite.

use clap::Args;
use taskcheck_harness::ImportHarness;
use taskcheck_harness::scenarios::Scenario;
use taskcheck_harness::suite::run_suite;

use crate::output::{format_duration, result_marker};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario to run; repeat to select several. Runs all when omitted.
    #[arg(short, long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// List scenario names and exit.
    #[arg(long)]
    pub list: bool,
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if a scenario name is unknown or any scenario fails.
pub fn execute(harness: &ImportHarness, args: RunArgs) -> anyhow::Result<()> {
    if args.list {
        for scenario in Scenario::ALL {
            println!("{scenario}");
        }
        return Ok(());
    }

    let scenarios = select(&args.scenarios)?;
    let report = run_suite(harness, &scenarios);

    println!("{:<24} {:<6} {:>9}  DETAIL", "SCENARIO", "RESULT", "TIME");
    for outcome in &report.outcomes {
        let detail = outcome
            .error
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        println!(
            "{:<24} {:<6} {:>9}  {detail}",
            outcome.scenario.name(),
            result_marker(outcome.passed()),
            format_duration(outcome.elapsed),
        );
    }
    println!();
    println!("{} passed, {} failed", report.passed(), report.failed());

    if report.all_passed() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} of {} scenarios failed",
            report.failed(),
            report.outcomes.len()
        ))
    }
}

fn select(names: &[String]) -> anyhow::Result<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| name.parse::<Scenario>().map_err(anyhow::Error::from))
        .collect()
}
