//! Blocking wait for a task to reach a status.

use std::time::{Duration, Instant};

use taskcheck_client::api::ImagesApi;
use taskcheck_common::config::HarnessConfig;
use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{Task, TaskId, TaskStatus};

/// Timing and retry policy for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause between fetches.
    pub interval: Duration,
    /// Wall-clock bound on the whole wait.
    pub timeout: Duration,
    /// Consecutive transport failures tolerated before giving up.
    pub transport_retries: u32,
}

impl PollSettings {
    /// Derives the policy from the harness configuration.
    #[must_use]
    pub const fn from_config(config: &HarnessConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            timeout: config.task_timeout(),
            transport_retries: config.transport_retries,
        }
    }
}

/// Fetches a task and requires HTTP 200.
///
/// # Errors
///
/// Returns an error if the request fails or the status is not 200.
pub fn fetch_task(api: &dyn ImagesApi, task_id: &TaskId) -> Result<Task> {
    api.get_task(task_id)?.expect_status(200, "get task")
}

/// Polls `task_id` until its status equals `desired`.
///
/// Polling an already-terminal task returns after a single fetch. A task that
/// settles in the other terminal status ends the wait at once, since terminal
/// tasks never transition again.
///
/// # Errors
///
/// - `HarnessError::Timeout` if `settings.timeout` elapses first.
/// - `HarnessError::UnexpectedTerminal` if the task ends in another terminal status.
/// - `HarnessError::Transport` once more than `settings.transport_retries`
///   consecutive fetches fail to reach the service.
/// - `HarnessError::Protocol` if a fetch returns a non-200 status.
pub fn wait_for_status(
    api: &dyn ImagesApi,
    task_id: &TaskId,
    desired: TaskStatus,
    settings: &PollSettings,
) -> Result<Task> {
    let start = Instant::now();
    let mut last_status = None;
    let mut transport_failures = 0;

    loop {
        match fetch_task(api, task_id) {
            Ok(task) => {
                transport_failures = 0;
                if last_status != Some(task.status) {
                    tracing::info!(task_id = %task_id, status = %task.status, "task status changed");
                }
                last_status = Some(task.status);

                if task.status == desired {
                    return Ok(task);
                }
                if task.status.is_terminal() {
                    return Err(HarnessError::UnexpectedTerminal {
                        task_id: task_id.clone(),
                        desired,
                        actual: task.status,
                        message: task.message.unwrap_or_default(),
                    });
                }
            }
            Err(e) if e.is_transient() && transport_failures < settings.transport_retries => {
                transport_failures += 1;
                tracing::warn!(
                    task_id = %task_id,
                    attempt = transport_failures,
                    error = %e,
                    "task fetch failed, retrying"
                );
            }
            Err(e) => return Err(e),
        }

        let elapsed = start.elapsed();
        if elapsed >= settings.timeout {
            return Err(HarnessError::Timeout {
                task_id: task_id.clone(),
                desired,
                last: last_status,
                waited_secs: elapsed.as_secs(),
            });
        }
        tracing::debug!(task_id = %task_id, status = ?last_status, "waiting for task");
        std::thread::sleep(settings.interval.min(settings.timeout - elapsed));
    }
}
