//! Import-task scenarios.
//!
//! Each scenario submits its own tasks, waits for the status it anticipates,
//! and returns `Ok(())` only if every check held.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;

use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{ImageId, TaskStatus, TaskType, Violation};

use crate::harness::ImportHarness;
use crate::submit;
use crate::validate::{self, DeltaMode, Validator};

/// One check of the import-task workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Import with no image properties and check the task generically and
    /// against submission time.
    ImportImage,
    /// Import the same input twice and check the tasks are distinct.
    DuplicateImport,
    /// Submit several imports back-to-back and check every image is listed.
    SimultaneousImports,
    /// Import with a `name` property and check the image carries it.
    ImportWithName,
    /// Import with a forbidden property and check the task fails with the
    /// configured message.
    ForbiddenProperties,
}

impl Scenario {
    /// Every scenario, in suite order.
    pub const ALL: [Self; 5] = [
        Self::ImportImage,
        Self::DuplicateImport,
        Self::SimultaneousImports,
        Self::ImportWithName,
        Self::ForbiddenProperties,
    ];

    /// Returns the kebab-case name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ImportImage => "import-image",
            Self::DuplicateImport => "duplicate-import",
            Self::SimultaneousImports => "simultaneous-imports",
            Self::ImportWithName => "import-with-name",
            Self::ForbiddenProperties => "forbidden-properties",
        }
    }

    /// Runs the scenario against the harness.
    ///
    /// # Errors
    ///
    /// Returns the first error that ends the scenario, or a
    /// `HarnessError::Validation` carrying every property mismatch.
    pub fn run(self, harness: &ImportHarness) -> Result<()> {
        match self {
            Self::ImportImage => import_image(harness),
            Self::DuplicateImport => duplicate_import(harness),
            Self::SimultaneousImports => simultaneous_imports(harness),
            Self::ImportWithName => import_with_name(harness),
            Self::ForbiddenProperties => forbidden_properties(harness),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| HarnessError::NotFound {
                kind: "scenario",
                id: s.to_string(),
            })
    }
}

fn import_image(harness: &ImportHarness) -> Result<()> {
    let config = harness.config();
    let response = submit::submit(harness.api(), &harness.import_input(), TaskType::Import)?;
    let created = response.expect_status(201, "create import task")?;
    let reference = Utc::now();

    let task = harness.wait_for_task_status(&created.id, TaskStatus::Success)?;

    let mut v = Validator::from(validate::validate_task(&task));
    let _ = v
        .within_delta(
            "created_at",
            reference,
            task.created_at,
            config.max_created_at_delta_secs,
            DeltaMode::Absolute,
        )
        .within_delta(
            "expires_at",
            reference,
            task.expires_at,
            config.max_expires_at_delta_secs,
            DeltaMode::Absolute,
        )
        .exact_opt("owner", config.tenant_id.as_str(), task.owner.as_deref())
        .exact("status", TaskStatus::Success, task.status)
        .within_delta(
            "updated_at",
            reference,
            task.updated_at,
            config.max_updated_at_delta_secs,
            DeltaMode::Absolute,
        );
    v.finish()
}

fn duplicate_import(harness: &ImportHarness) -> Result<()> {
    let input = harness.import_input();
    let mut tasks = Vec::with_capacity(2);
    for _ in 0..2 {
        let created = harness.submit_import(&input)?;
        tasks.push(harness.wait_for_task_status(&created.id, TaskStatus::Success)?);
    }

    if tasks[0] == tasks[1] || tasks[0].id == tasks[1].id {
        return Err(HarnessError::Assertion {
            message: format!(
                "identical inputs produced the same task: {} and {}",
                tasks[0].id, tasks[1].id
            ),
        });
    }
    Ok(())
}

fn simultaneous_imports(harness: &ImportHarness) -> Result<()> {
    let input = harness.import_input();
    let count = harness.config().simultaneous_tasks;

    let mut submitted = Vec::with_capacity(count);
    for _ in 0..count {
        submitted.push(harness.submit_import(&input)?);
    }
    tracing::info!(count, "submitted import tasks back-to-back");

    let mut imported: Vec<ImageId> = Vec::with_capacity(count);
    for created in &submitted {
        let task = harness.wait_for_task_status(&created.id, TaskStatus::Success)?;
        let image_id = task.image_id().cloned().ok_or_else(|| HarnessError::Assertion {
            message: format!("task {} succeeded without an image id", task.id),
        })?;
        imported.push(image_id);
    }

    let listed: Vec<ImageId> = harness
        .list_all_images()?
        .into_iter()
        .map(|image| image.id)
        .collect();
    let missing: Vec<String> = imported
        .iter()
        .filter(|id| !listed.contains(id))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(HarnessError::Assertion {
            message: format!(
                "imported images not listed: {} (listed {} images)",
                missing.join(", "),
                listed.len()
            ),
        });
    }
    Ok(())
}

fn import_with_name(harness: &ImportHarness) -> Result<()> {
    let name = format!("image-{}", uuid::Uuid::new_v4().simple());
    let input = harness.import_input().with_property("name", name.as_str());

    let created = harness.submit_import(&input)?;
    let task = harness.wait_for_task_status(&created.id, TaskStatus::Success)?;

    let mut v = Validator::from(validate::validate_task(&task));
    match task.image_id() {
        Some(image_id) => {
            let image = harness.image_details(image_id)?;
            let _ = v.exact_opt("name", name.as_str(), image.name.as_deref());
        }
        None => {
            let _ = v.push(Violation::new("image name", &name, "no image produced"));
        }
    }
    v.finish()
}

fn forbidden_properties(harness: &ImportHarness) -> Result<()> {
    let expected = harness.config().extra_image_properties_message.as_str();
    let input = harness
        .import_input()
        .with_property("image_type", TaskType::Import.to_string());

    let created = harness.submit_import(&input)?;
    let task = harness.wait_for_task_status(&created.id, TaskStatus::Failure)?;

    let received = task.message.as_deref().unwrap_or_default();
    if received != expected {
        return Err(HarnessError::Assertion {
            message: format!("unexpected failure message. Expected: {expected} Received: {received}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_names_round_trip_through_from_str() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().ok(), Some(scenario));
        }
    }

    #[test]
    fn unknown_scenario_name_is_not_found() {
        let err = "import-everything".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, HarnessError::NotFound { kind: "scenario", .. }));
    }
}
