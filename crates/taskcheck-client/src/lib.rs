//! # taskcheck-client
//!
//! Access to the image service's task and image endpoints.
//!
//! Handles:
//! - **API**: The [`ImagesApi`](api::ImagesApi) trait the harness drives.
//! - **HTTP**: A blocking `reqwest` implementation against a live service.
//! - **Simulation**: An in-process service that walks tasks through their
//!   lifecycle, used for dry runs and tests.
//! - **Sources**: Validation of `import_from` URIs.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod api;
pub mod http;
pub mod simulated;
pub mod source;
