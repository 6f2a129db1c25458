//! In-process image service.
//!
//! Walks each task through `queued -> processing -> success|failure` as it is
//! polled, enforces the allowed image-property set, and records produced
//! images in a paginated listing. Backs `taskcheck run --dry-run` and the
//! workspace tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};

use taskcheck_common::constants::{
    self, DEFAULT_EXTRA_IMAGE_PROPERTIES_MSG, IMAGES_PATH, TASK_CREATED_STATUS, TASK_SCHEMA,
    TASK_TIME_TO_LIVE_SECS,
};
use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{
    CreateTaskRequest, Image, ImageId, ImagePage, Task, TaskId, TaskResult, TaskStatus,
};

use crate::api::{ApiResponse, ImagesApi};

/// Behaviour knobs for the simulated service.
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    /// Tenant recorded as owner of every task and image.
    pub owner: String,
    /// Polls a task spends in each non-terminal status before advancing.
    pub polls_per_stage: u32,
    /// Failure message for tasks with forbidden image properties.
    pub extra_properties_message: String,
    /// Status returned by task creation; anything but 201 rejects the task.
    pub create_status: u16,
    /// Number of upcoming `get_task` calls that fail at the transport level.
    pub transport_failures: u32,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            owner: "simulated-tenant".into(),
            polls_per_stage: 1,
            extra_properties_message: DEFAULT_EXTRA_IMAGE_PROPERTIES_MSG.into(),
            create_status: TASK_CREATED_STATUS,
            transport_failures: 0,
        }
    }
}

#[derive(Debug)]
struct TrackedTask {
    task: Task,
    polls_in_stage: u32,
    image_name: Option<String>,
    rejected: bool,
}

#[derive(Debug, Default)]
struct ServiceState {
    tasks: HashMap<TaskId, TrackedTask>,
    images: Vec<Image>,
    transport_failures: u32,
    get_task_calls: u64,
}

/// `ImagesApi` implementation that keeps all state in memory.
#[derive(Debug)]
pub struct SimulatedImageService {
    options: SimulatorOptions,
    state: Mutex<ServiceState>,
}

impl SimulatedImageService {
    /// Creates a service with the given options and no images.
    #[must_use]
    pub fn new(options: SimulatorOptions) -> Self {
        let state = ServiceState {
            transport_failures: options.transport_failures,
            ..ServiceState::default()
        };
        Self {
            options,
            state: Mutex::new(state),
        }
    }

    /// Adds an image that exists independently of any task.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn seed_image(&self, name: &str) -> Result<ImageId> {
        let image = self.new_image(Some(name.to_string()));
        let id = image.id.clone();
        self.lock()?.images.push(image);
        Ok(id)
    }

    /// Returns how many times `get_task` has been called.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn get_task_calls(&self) -> Result<u64> {
        Ok(self.lock()?.get_task_calls)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServiceState>> {
        self.state.lock().map_err(|_| HarnessError::Config {
            message: "simulated service lock poisoned".into(),
        })
    }

    fn new_image(&self, name: Option<String>) -> Image {
        Image {
            id: ImageId::generate(),
            name,
            status: Some("active".into()),
            owner: Some(self.options.owner.clone()),
            created_at: Some(Utc::now()),
        }
    }

    fn advance(&self, state: &mut ServiceState, id: &TaskId) -> Option<Task> {
        let stage_len = self.options.polls_per_stage.max(1);
        let tracked = state.tasks.get_mut(id)?;
        if tracked.task.status.is_terminal() {
            return Some(tracked.task.clone());
        }

        tracked.polls_in_stage = tracked.polls_in_stage.saturating_add(1);
        if tracked.polls_in_stage < stage_len {
            return Some(tracked.task.clone());
        }
        tracked.polls_in_stage = 0;

        let now = Utc::now();
        tracked.task.updated_at = Some(now);
        let mut produced = None;
        let current = tracked.task.status;
        match current {
            TaskStatus::Queued => tracked.task.status = TaskStatus::Processing,
            TaskStatus::Processing if tracked.rejected => {
                tracked.task.status = TaskStatus::Failure;
                tracked.task.message = Some(self.options.extra_properties_message.clone());
                tracked.task.expires_at = Some(now + Duration::seconds(TASK_TIME_TO_LIVE_SECS));
            }
            TaskStatus::Processing => {
                let image = self.new_image(tracked.image_name.clone());
                tracked.task.status = TaskStatus::Success;
                tracked.task.message = Some(String::new());
                tracked.task.result = Some(TaskResult {
                    image_id: Some(image.id.clone()),
                });
                tracked.task.expires_at = Some(now + Duration::seconds(TASK_TIME_TO_LIVE_SECS));
                produced = Some(image);
            }
            TaskStatus::Success | TaskStatus::Failure => {}
        }
        tracing::debug!(task_id = %id, status = %tracked.task.status, "simulated task advanced");

        let task = tracked.task.clone();
        if let Some(image) = produced {
            state.images.push(image);
        }
        Some(task)
    }
}

impl Default for SimulatedImageService {
    fn default() -> Self {
        Self::new(SimulatorOptions::default())
    }
}

impl ImagesApi for SimulatedImageService {
    fn create_task(&self, request: &CreateTaskRequest) -> Result<ApiResponse<Task>> {
        if self.options.create_status != TASK_CREATED_STATUS {
            return Ok(ApiResponse::empty(self.options.create_status));
        }

        let id = TaskId::generate();
        let now = Utc::now();
        let task = Task {
            id: id.clone(),
            task_type: Some(request.task_type),
            status: TaskStatus::Queued,
            owner: Some(self.options.owner.clone()),
            input: Some(serde_json::to_value(&request.input)?),
            result: None,
            message: None,
            created_at: Some(now),
            updated_at: Some(now),
            expires_at: None,
            self_link: Some(constants::task_self_link(id.as_str())),
            schema: Some(TASK_SCHEMA.into()),
        };
        let image_name = request
            .input
            .image_properties
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string);
        let tracked = TrackedTask {
            task: task.clone(),
            polls_in_stage: 0,
            image_name,
            rejected: !request.input.forbidden_properties().is_empty(),
        };

        let _ = self.lock()?.tasks.insert(id.clone(), tracked);
        tracing::debug!(task_id = %id, "simulated task created");
        Ok(ApiResponse::ok(TASK_CREATED_STATUS, task))
    }

    fn get_task(&self, id: &TaskId) -> Result<ApiResponse<Task>> {
        let mut state = self.lock()?;
        state.get_task_calls += 1;
        if state.transport_failures > 0 {
            state.transport_failures -= 1;
            return Err(HarnessError::Transport {
                operation: "get task".into(),
                message: "simulated connection reset".into(),
            });
        }
        Ok(self
            .advance(&mut state, id)
            .map_or_else(|| ApiResponse::empty(404), |task| ApiResponse::ok(200, task)))
    }

    fn get_image(&self, id: &ImageId) -> Result<ApiResponse<Image>> {
        let state = self.lock()?;
        Ok(state
            .images
            .iter()
            .find(|image| &image.id == id)
            .cloned()
            .map_or_else(|| ApiResponse::empty(404), |image| ApiResponse::ok(200, image)))
    }

    fn list_images(&self, limit: u32, marker: Option<&ImageId>) -> Result<ApiResponse<ImagePage>> {
        let state = self.lock()?;
        let start = match marker {
            None => 0,
            Some(marker) => match state.images.iter().position(|image| &image.id == marker) {
                Some(index) => index + 1,
                None => return Ok(ApiResponse::empty(400)),
            },
        };
        let limit = usize::try_from(limit.max(1)).unwrap_or(usize::MAX);
        let images: Vec<Image> = state.images.iter().skip(start).take(limit).cloned().collect();
        let next = match images.last() {
            Some(last) if start + images.len() < state.images.len() => {
                Some(format!("{IMAGES_PATH}?marker={}", last.id))
            }
            _ => None,
        };
        Ok(ApiResponse::ok(200, ImagePage { images, next }))
    }
}
