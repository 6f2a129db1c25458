//! Property validation with error aggregation.
//!
//! Checks never stop at the first mismatch. Each one appends a
//! [`Violation`] to the [`Validator`], and the caller decides pass or fail
//! once every property has been looked at.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use taskcheck_common::constants::{TASK_SCHEMA, task_self_link};
use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{Task, TaskStatus, Violation};

/// How drift between a reference time and an observed time is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    /// `|observed - reference|`; tolerates skew in both directions.
    Absolute,
    /// `observed - reference`; an observation before the reference is zero drift.
    Forward,
}

/// Returns the drift of `observed` from `reference` in whole seconds.
#[must_use]
pub fn time_delta(reference: DateTime<Utc>, observed: DateTime<Utc>, mode: DeltaMode) -> i64 {
    let delta = (observed - reference).num_seconds();
    match mode {
        DeltaMode::Absolute => delta.abs(),
        DeltaMode::Forward => delta.max(0),
    }
}

/// Accumulates property mismatches in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    /// Creates an empty validator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Records a violation directly.
    pub fn push(&mut self, violation: Violation) -> &mut Self {
        self.violations.push(violation);
        self
    }

    /// Flags `field` if `expected != actual`.
    pub fn exact<T: PartialEq + Display>(&mut self, field: &str, expected: T, actual: T) -> &mut Self {
        if expected != actual {
            self.violations.push(Violation::new(field, expected, actual));
        }
        self
    }

    /// Flags `field` if it is missing or differs from `expected`.
    pub fn exact_opt<T: PartialEq + Display>(
        &mut self,
        field: &str,
        expected: T,
        actual: Option<T>,
    ) -> &mut Self {
        match actual {
            Some(actual) => self.exact(field, expected, actual),
            None => self.push(Violation::new(field, expected, "None")),
        }
    }

    /// Flags `field` if it is missing.
    pub fn present<T>(&mut self, field: &str, actual: Option<&T>) -> &mut Self {
        if actual.is_none() {
            self.violations.push(Violation::new(field, "not None", "None"));
        }
        self
    }

    /// Flags `field` if its drift from `reference` exceeds `max_secs`.
    ///
    /// A missing timestamp is itself a violation.
    pub fn within_delta(
        &mut self,
        field: &str,
        reference: DateTime<Utc>,
        observed: Option<DateTime<Utc>>,
        max_secs: i64,
        mode: DeltaMode,
    ) -> &mut Self {
        let name = format!("{field} delta");
        let Some(observed) = observed else {
            return self.push(Violation::new(name, max_secs, "None"));
        };
        let delta = time_delta(reference, observed, mode);
        if delta > max_secs {
            self.violations.push(Violation::new(name, max_secs, delta));
        }
        self
    }

    /// Returns the violations found so far.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns whether no violation has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes the validator, returning every violation.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Passes if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Validation` carrying every violation.
    pub fn finish(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Validation {
                violations: self.violations,
            })
        }
    }
}

impl From<Vec<Violation>> for Validator {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

/// Checks the properties every completed task must carry.
#[must_use]
pub fn validate_task(task: &Task) -> Vec<Violation> {
    let mut v = Validator::new();

    if uuid::Uuid::parse_str(task.id.as_str()).is_err() {
        let _ = v.push(Violation::new("id", "a UUID", &task.id));
    }
    let _ = v
        .present("type", task.task_type.as_ref())
        .present("owner", task.owner.as_ref())
        .present("input", task.input.as_ref())
        .present("created_at", task.created_at.as_ref())
        .present("updated_at", task.updated_at.as_ref());
    if task.status != TaskStatus::Failure {
        let _ = v.present("expires_at", task.expires_at.as_ref());
    }
    let _ = v
        .exact_opt("self", task_self_link(task.id.as_str()), task.self_link.clone())
        .exact_opt("schema", TASK_SCHEMA.to_string(), task.schema.clone());
    if task.status == TaskStatus::Success {
        let _ = v.present("result image_id", task.image_id());
    }

    v.into_violations()
}
