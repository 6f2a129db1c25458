//! `taskcheck submit` — Submit a single import task.

use clap::Args;
use taskcheck_common::types::TaskStatus;
use taskcheck_harness::ImportHarness;

/// Arguments for the `submit` command.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Image property to set, as KEY=VALUE. Repeatable.
    #[arg(short, long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Block until the task reaches this status.
    #[arg(long, value_name = "STATUS", value_parser = parse_status)]
    pub wait: Option<TaskStatus>,
}

/// Executes the `submit` command.
///
/// # Errors
///
/// Returns an error if the service rejects the task or the wait fails.
pub fn execute(harness: &ImportHarness, args: SubmitArgs) -> anyhow::Result<()> {
    let input = args
        .properties
        .into_iter()
        .fold(harness.import_input(), |input, (key, value)| input.with_property(key, value));

    let forbidden = input.forbidden_properties();
    if !forbidden.is_empty() {
        tracing::warn!(properties = ?forbidden, "the service is expected to fail this task");
    }

    let task = harness.submit_import(&input)?;
    println!("{}\t{}", task.id, task.status);

    if let Some(desired) = args.wait {
        let task = harness.wait_for_task_status(&task.id, desired)?;
        println!("{}", serde_json::to_string_pretty(&task)?);
    }
    Ok(())
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got \"{raw}\"")),
    }
}

pub(crate) fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    raw.parse().map_err(|e: taskcheck_common::error::HarnessError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_property_splits_on_first_equals() {
        assert_eq!(
            parse_property("name=a=b").expect("parse"),
            ("name".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn parse_property_rejects_missing_key() {
        assert!(parse_property("=value").is_err());
        assert!(parse_property("novalue").is_err());
    }

    #[test]
    fn parse_status_accepts_wire_names() {
        assert_eq!(parse_status("failure"), Ok(TaskStatus::Failure));
        assert!(parse_status("finished").is_err());
    }
}
