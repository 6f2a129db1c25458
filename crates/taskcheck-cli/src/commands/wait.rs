//! `taskcheck wait` — Wait for a task to reach a status.

use clap::Args;
use taskcheck_common::types::{TaskId, TaskStatus};
use taskcheck_harness::ImportHarness;
use taskcheck_harness::validate::validate_task;

use super::submit::parse_status;

/// Arguments for the `wait` command.
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Task identifier.
    pub task_id: String,

    /// Status to wait for.
    #[arg(long, default_value = "success", value_parser = parse_status)]
    pub status: TaskStatus,
}

/// Executes the `wait` command.
///
/// Prints the task once it reaches the status, followed by any generic
/// property violations.
///
/// # Errors
///
/// Returns an error if the wait times out or the task ends elsewhere.
pub fn execute(harness: &ImportHarness, args: WaitArgs) -> anyhow::Result<()> {
    let task = harness.wait_for_task_status(&TaskId::new(args.task_id), args.status)?;
    println!("{}", serde_json::to_string_pretty(&task)?);

    for violation in validate_task(&task) {
        eprintln!("  warning: {violation}");
    }
    Ok(())
}
