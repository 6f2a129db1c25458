//! Task submission.
//!
//! Submissions are never retried: a rejected creation request means the
//! request or the service broke its contract.

use taskcheck_client::api::{ApiResponse, ImagesApi};
use taskcheck_common::constants::TASK_CREATED_STATUS;
use taskcheck_common::error::Result;
use taskcheck_common::types::{CreateTaskRequest, ImportInput, Task, TaskType};

/// Sends a task-creation request and returns the raw status and task.
///
/// # Errors
///
/// Returns an error if the request cannot be sent or the body does not decode.
pub fn submit(api: &dyn ImagesApi, input: &ImportInput, task_type: TaskType) -> Result<ApiResponse<Task>> {
    let request = CreateTaskRequest {
        task_type,
        input: input.clone(),
    };
    let response = api.create_task(&request)?;
    tracing::info!(
        task_type = %task_type,
        status = response.status,
        task_id = response.entity.as_ref().map(|t| t.id.to_string()).unwrap_or_default(),
        "task submitted"
    );
    Ok(response)
}

/// Submits a task and requires the service to accept it with HTTP 201.
///
/// # Errors
///
/// Returns `HarnessError::Protocol` for any other status.
pub fn submit_accepted(api: &dyn ImagesApi, input: &ImportInput, task_type: TaskType) -> Result<Task> {
    submit(api, input, task_type)?.expect_status(TASK_CREATED_STATUS, "create task")
}
