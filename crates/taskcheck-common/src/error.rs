//! Unified error types for the taskcheck workspace.
//!
//! Every failure a scenario can hit maps to one variant, so a run report can
//! tell a protocol violation from a timeout or a batch of property mismatches.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{TaskId, TaskStatus, Violation};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The service answered with an unexpected HTTP status.
    #[error("{operation}: expected HTTP {expected}, received {actual}")]
    Protocol {
        /// Operation that was attempted.
        operation: String,
        /// Expected status code.
        expected: u16,
        /// Received status code.
        actual: u16,
    },

    /// A task did not reach the desired status in time.
    #[error(
        "task {task_id} did not reach {desired} within {waited_secs}s (last status: {})",
        .last.map_or("unknown", TaskStatus::as_str)
    )]
    Timeout {
        /// Task being waited on.
        task_id: TaskId,
        /// Status the caller waited for.
        desired: TaskStatus,
        /// Last status observed before the deadline.
        last: Option<TaskStatus>,
        /// Seconds spent waiting.
        waited_secs: u64,
    },

    /// A task settled in a terminal status other than the desired one.
    #[error("task {task_id} ended in {actual} while waiting for {desired}: {message}")]
    UnexpectedTerminal {
        /// Task being waited on.
        task_id: TaskId,
        /// Status the caller waited for.
        desired: TaskStatus,
        /// Terminal status the task reached.
        actual: TaskStatus,
        /// Diagnostic reported by the service.
        message: String,
    },

    /// One or more property checks failed.
    #[error("{} validation error(s): {}", .violations.len(), join_violations(.violations))]
    Validation {
        /// Every mismatch, in discovery order.
        violations: Vec<Violation>,
    },

    /// A scenario-level expectation did not hold.
    #[error("assertion failed: {message}")]
    Assertion {
        /// Description of the failed expectation.
        message: String,
    },

    /// The HTTP request could not be completed.
    #[error("transport error during {operation}: {message}")]
    Transport {
        /// Operation that was attempted.
        operation: String,
        /// Underlying transport failure.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Underlying decoding error.
        source: serde_json::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl HarnessError {
    /// Returns whether retrying the same request might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HarnessError>;
