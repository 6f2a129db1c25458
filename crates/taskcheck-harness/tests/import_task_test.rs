//! End-to-end tests of the import-task scenarios.
//!
//! These run the full pipeline against the in-process service:
//! 1. Submit import tasks (201 required)
//! 2. Poll until the anticipated terminal status
//! 3. Validate task and image properties with aggregation
//! 4. Report outcomes through the suite runner

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use taskcheck_client::api::{ApiResponse, ImagesApi};
use taskcheck_client::simulated::{SimulatedImageService, SimulatorOptions};
use taskcheck_common::config::HarnessConfig;
use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{
    CreateTaskRequest, Image, ImageId, ImagePage, Task, TaskId, TaskStatus,
};
use taskcheck_harness::ImportHarness;
use taskcheck_harness::poll::PollSettings;
use taskcheck_harness::scenarios::Scenario;
use taskcheck_harness::suite::run_suite;

const TENANT: &str = "tenant-under-test";

fn config() -> HarnessConfig {
    HarnessConfig {
        tenant_id: TENANT.into(),
        import_from: "swift://images/cirros.qcow2".into(),
        poll_interval_secs: 0,
        task_timeout_secs: 5,
        list_page_size: 2,
        ..HarnessConfig::default()
    }
}

fn options() -> SimulatorOptions {
    SimulatorOptions {
        owner: TENANT.into(),
        polls_per_stage: 2,
        ..SimulatorOptions::default()
    }
}

fn harness_with(options: SimulatorOptions, config: HarnessConfig) -> ImportHarness {
    ImportHarness::new(Box::new(SimulatedImageService::new(options)), config).expect("harness")
}

/// Rewrites what the simulated service reports before the harness sees it.
struct SkewedService {
    inner: SimulatedImageService,
    created_at_skew: chrono::Duration,
    updated_at_skew: chrono::Duration,
    image_name: Option<&'static str>,
    drop_result: bool,
}

impl SkewedService {
    fn new() -> Self {
        Self {
            inner: SimulatedImageService::new(options()),
            created_at_skew: chrono::Duration::zero(),
            updated_at_skew: chrono::Duration::zero(),
            image_name: None,
            drop_result: false,
        }
    }
}

impl ImagesApi for SkewedService {
    fn create_task(&self, request: &CreateTaskRequest) -> Result<ApiResponse<Task>> {
        self.inner.create_task(request)
    }

    fn get_task(&self, id: &TaskId) -> Result<ApiResponse<Task>> {
        let mut response = self.inner.get_task(id)?;
        if let Some(task) = response.entity.as_mut() {
            task.created_at = task.created_at.map(|t| t + self.created_at_skew);
            task.updated_at = task.updated_at.map(|t| t + self.updated_at_skew);
            if self.drop_result {
                task.result = None;
            }
        }
        Ok(response)
    }

    fn get_image(&self, id: &ImageId) -> Result<ApiResponse<Image>> {
        let mut response = self.inner.get_image(id)?;
        if let (Some(image), Some(name)) = (response.entity.as_mut(), self.image_name) {
            image.name = Some(name.to_string());
        }
        Ok(response)
    }

    fn list_images(&self, limit: u32, marker: Option<&ImageId>) -> Result<ApiResponse<ImagePage>> {
        self.inner.list_images(limit, marker)
    }
}

fn violations_of(err: HarnessError) -> Vec<taskcheck_common::types::Violation> {
    let HarnessError::Validation { violations } = err else {
        unreachable!("expected validation error, got {err:?}");
    };
    violations
}

// ── Suite ────────────────────────────────────────────────────────────

#[test]
fn full_suite_passes_against_conforming_service() {
    let harness = harness_with(options(), config());
    let report = run_suite(&harness, &Scenario::ALL);

    for outcome in &report.outcomes {
        assert!(outcome.passed(), "{} failed: {:?}", outcome.scenario, outcome.error);
    }
    assert_eq!(report.passed(), 5);
    assert!(report.all_passed());
}

#[test]
fn suite_continues_after_a_failing_scenario() {
    let harness = harness_with(
        SimulatorOptions {
            owner: "someone-else".into(),
            ..options()
        },
        config(),
    );
    let report = run_suite(
        &harness,
        &[Scenario::ImportImage, Scenario::DuplicateImport],
    );

    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.outcomes[0].passed());
    assert!(report.outcomes[1].passed());
    assert_eq!(report.failed(), 1);
}

// ── Import image ─────────────────────────────────────────────────────

#[test]
fn import_image_reports_owner_mismatch_as_validation_error() {
    let harness = harness_with(
        SimulatorOptions {
            owner: "someone-else".into(),
            ..options()
        },
        config(),
    );
    let err = Scenario::ImportImage.run(&harness).unwrap_err();
    let HarnessError::Validation { violations } = err else {
        unreachable!("expected validation error, got {err:?}");
    };
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "owner");
    assert_eq!(violations[0].expected, TENANT);
    assert_eq!(violations[0].received, "someone-else");
}

#[test]
fn import_image_collects_every_violation_at_once() {
    let harness = harness_with(
        SimulatorOptions {
            owner: "someone-else".into(),
            ..options()
        },
        HarnessConfig {
            max_expires_at_delta_secs: 60,
            ..config()
        },
    );
    let err = Scenario::ImportImage.run(&harness).unwrap_err();
    let HarnessError::Validation { violations } = err else {
        unreachable!("expected validation error, got {err:?}");
    };
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["expires_at delta", "owner"]);
}

#[test]
fn import_image_flags_created_and_updated_drift() {
    let service = SkewedService {
        created_at_skew: chrono::Duration::hours(-2),
        updated_at_skew: chrono::Duration::hours(3),
        ..SkewedService::new()
    };
    let harness = ImportHarness::new(Box::new(service), config()).expect("harness");

    let violations = violations_of(Scenario::ImportImage.run(&harness).unwrap_err());
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["created_at delta", "updated_at delta"]);

    let created: i64 = violations[0].received.parse().expect("created delta");
    let updated: i64 = violations[1].received.parse().expect("updated delta");
    assert!((7199..7260).contains(&created), "created_at delta {created}");
    assert!((10799..10860).contains(&updated), "updated_at delta {updated}");
    assert_eq!(violations[0].expected, "60");
    assert_eq!(violations[1].expected, "3600");
}

#[test]
fn import_image_fails_on_rejected_submission() {
    let harness = harness_with(
        SimulatorOptions {
            create_status: 403,
            ..options()
        },
        config(),
    );
    let err = Scenario::ImportImage.run(&harness).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Protocol {
            expected: 201,
            actual: 403,
            ..
        }
    ));
}

#[test]
fn import_image_times_out_on_stalled_task() {
    let harness = harness_with(
        SimulatorOptions {
            polls_per_stage: u32::MAX,
            ..options()
        },
        config(),
    )
    .with_poll_settings(PollSettings {
        interval: Duration::from_millis(5),
        timeout: Duration::from_millis(50),
        transport_retries: 0,
    });

    let err = Scenario::ImportImage.run(&harness).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Timeout {
            desired: TaskStatus::Success,
            last: Some(TaskStatus::Queued),
            ..
        }
    ));
}

// ── Simultaneous imports ─────────────────────────────────────────────

#[test]
fn simultaneous_imports_finds_images_across_pages() {
    let service = SimulatedImageService::new(options());
    for i in 0..3 {
        let _ = service.seed_image(&format!("pre-existing-{i}")).expect("seed failed");
    }
    let harness = ImportHarness::new(Box::new(service), config()).expect("harness");

    Scenario::SimultaneousImports
        .run(&harness)
        .expect("simultaneous imports should pass");
    assert_eq!(harness.list_all_images().expect("list failed").len(), 8);
}

#[test]
fn simultaneous_imports_honours_configured_count() {
    let harness = harness_with(
        options(),
        HarnessConfig {
            simultaneous_tasks: 3,
            ..config()
        },
    );
    Scenario::SimultaneousImports.run(&harness).expect("scenario failed");
    assert_eq!(harness.list_all_images().expect("list failed").len(), 3);
}

// ── Forbidden properties ─────────────────────────────────────────────

#[test]
fn forbidden_properties_expects_configured_message() {
    let harness = harness_with(
        SimulatorOptions {
            extra_properties_message: "Image properties other than name are not allowed".into(),
            ..options()
        },
        config(),
    );
    Scenario::ForbiddenProperties.run(&harness).expect("scenario failed");
}

#[test]
fn forbidden_properties_flags_different_message() {
    let harness = harness_with(
        SimulatorOptions {
            extra_properties_message: "something else entirely".into(),
            ..options()
        },
        config(),
    );
    let err = Scenario::ForbiddenProperties.run(&harness).unwrap_err();
    assert!(matches!(err, HarnessError::Assertion { .. }));
    assert!(err.to_string().contains("something else entirely"));
}

// ── Import with name ─────────────────────────────────────────────────

#[test]
fn import_with_name_flags_renamed_image() {
    let service = SkewedService {
        image_name: Some("renamed-by-service"),
        ..SkewedService::new()
    };
    let harness = ImportHarness::new(Box::new(service), config()).expect("harness");

    let violations = violations_of(Scenario::ImportWithName.run(&harness).unwrap_err());
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "name");
    assert!(violations[0].expected.starts_with("image-"));
    assert_eq!(violations[0].received, "renamed-by-service");
}

#[test]
fn import_with_name_flags_missing_image() {
    let service = SkewedService {
        drop_result: true,
        ..SkewedService::new()
    };
    let harness = ImportHarness::new(Box::new(service), config()).expect("harness");

    let violations = violations_of(Scenario::ImportWithName.run(&harness).unwrap_err());
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["result image_id", "image name"]);
    assert_eq!(violations[1].received, "no image produced");
}

// ── Polling resilience ───────────────────────────────────────────────

#[test]
fn import_with_name_survives_transient_transport_failures() {
    let harness = harness_with(
        SimulatorOptions {
            transport_failures: 2,
            ..options()
        },
        config(),
    );
    Scenario::ImportWithName.run(&harness).expect("scenario failed");
}
