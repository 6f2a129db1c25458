//! Harness configuration model.
//!
//! Loaded from an optional JSON file; any field missing from the file keeps
//! its default. The CLI layers flag and environment overrides on top.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{HarnessError, Result};

/// Root configuration for a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL of the image service.
    pub endpoint: String,
    /// Pre-issued authentication token.
    pub auth_token: String,
    /// Tenant the token belongs to; expected owner of created tasks.
    pub tenant_id: String,
    /// Source URI the import scenarios pull from.
    pub import_from: String,
    /// Seconds between task polls.
    pub poll_interval_secs: u64,
    /// Upper bound on one wait for task status, in seconds.
    pub task_timeout_secs: u64,
    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Consecutive transport failures tolerated while polling.
    pub transport_retries: u32,
    /// Page size used when listing all images.
    pub list_page_size: u32,
    /// Number of tasks the simultaneous scenario submits.
    pub simultaneous_tasks: usize,
    /// Tolerated drift of `created_at` from submission time, in seconds.
    pub max_created_at_delta_secs: i64,
    /// Tolerated drift of `updated_at` from submission time, in seconds.
    pub max_updated_at_delta_secs: i64,
    /// Tolerated drift of `expires_at` from submission time, in seconds.
    pub max_expires_at_delta_secs: i64,
    /// Failure message the service reports for forbidden image properties.
    pub extra_image_properties_message: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::DEFAULT_ENDPOINT.into(),
            auth_token: String::new(),
            tenant_id: String::new(),
            import_from: constants::DEFAULT_IMPORT_FROM.into(),
            poll_interval_secs: constants::DEFAULT_POLL_INTERVAL_SECS,
            task_timeout_secs: constants::DEFAULT_TASK_TIMEOUT_SECS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            transport_retries: constants::DEFAULT_TRANSPORT_RETRIES,
            list_page_size: constants::DEFAULT_LIST_PAGE_SIZE,
            simultaneous_tasks: constants::DEFAULT_SIMULTANEOUS_TASKS,
            max_created_at_delta_secs: constants::DEFAULT_MAX_CREATED_AT_DELTA_SECS,
            max_updated_at_delta_secs: constants::DEFAULT_MAX_UPDATED_AT_DELTA_SECS,
            max_expires_at_delta_secs: constants::DEFAULT_MAX_EXPIRES_AT_DELTA_SECS,
            extra_image_properties_message: constants::DEFAULT_EXTRA_IMAGE_PROPERTIES_MSG.into(),
        }
    }
}

impl HarnessConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading harness configuration");
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| HarnessError::Decode {
            context: format!("configuration file {}", path.display()),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can drive a run.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(config_error(format!(
                "endpoint must be an http(s) URL, got \"{}\"",
                self.endpoint
            )));
        }
        if self.import_from.trim().is_empty() {
            return Err(config_error("import_from must not be empty"));
        }
        if self.task_timeout_secs == 0 {
            return Err(config_error("task_timeout_secs must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(config_error("request_timeout_secs must be positive"));
        }
        if self.list_page_size == 0 {
            return Err(config_error("list_page_size must be positive"));
        }
        if self.simultaneous_tasks == 0 {
            return Err(config_error("simultaneous_tasks must be positive"));
        }
        let deltas = [
            ("max_created_at_delta_secs", self.max_created_at_delta_secs),
            ("max_updated_at_delta_secs", self.max_updated_at_delta_secs),
            ("max_expires_at_delta_secs", self.max_expires_at_delta_secs),
        ];
        if let Some((name, _)) = deltas.iter().find(|(_, v)| *v < 0) {
            return Err(config_error(format!("{name} must not be negative")));
        }
        Ok(())
    }

    /// Returns the endpoint without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Interval between task polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Upper bound on one wait for task status.
    #[must_use]
    pub const fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn config_error(message: impl Into<String>) -> HarnessError {
    HarnessError::Config {
        message: message.into(),
    }
}
