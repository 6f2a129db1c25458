//! # taskcheck-harness
//!
//! Orchestration of the image service's asynchronous import-task workflow.
//!
//! A scenario submits one or more tasks ([`submit`]), blocks until each
//! reaches the status it anticipates ([`poll`]), then checks every property
//! of the result and reports all mismatches at once ([`validate`]).
//! [`scenarios`] holds the import-task checks and [`suite`] runs them.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod harness;
pub mod poll;
pub mod scenarios;
pub mod submit;
pub mod suite;
pub mod validate;

pub use harness::ImportHarness;
