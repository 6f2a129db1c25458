//! Sequential scenario runner.

use std::time::{Duration, Instant};

use taskcheck_common::error::HarnessError;

use crate::harness::ImportHarness;
use crate::scenarios::Scenario;

/// Result of one scenario.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Scenario that ran.
    pub scenario: Scenario,
    /// Wall-clock time the scenario took.
    pub elapsed: Duration,
    /// Error that failed the scenario, if any.
    pub error: Option<HarnessError>,
}

impl ScenarioOutcome {
    /// Returns whether the scenario passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a suite run, in execution order.
#[derive(Debug, Default)]
pub struct SuiteReport {
    /// One entry per scenario.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Number of passed scenarios.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Number of failed scenarios.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Returns whether every scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs `scenarios` one after another.
///
/// A failing scenario never stops the suite; each outcome is recorded.
pub fn run_suite(harness: &ImportHarness, scenarios: &[Scenario]) -> SuiteReport {
    let mut report = SuiteReport::default();
    for &scenario in scenarios {
        tracing::info!(scenario = %scenario, "scenario started");
        let start = Instant::now();
        let result = scenario.run(harness);
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(
                scenario = %scenario,
                elapsed_secs = elapsed.as_secs_f64(),
                "scenario passed"
            ),
            Err(e) => tracing::error!(scenario = %scenario, error = %e, "scenario failed"),
        }
        report.outcomes.push(ScenarioOutcome {
            scenario,
            elapsed,
            error: result.err(),
        });
    }
    report
}
