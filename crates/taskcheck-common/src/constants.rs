//! API paths, wire constants, and configuration defaults.

/// Path of the task collection on the image service.
pub const TASKS_PATH: &str = "/v2/tasks";

/// Path of the image collection on the image service.
pub const IMAGES_PATH: &str = "/v2/images";

/// Schema link every task representation is expected to carry.
pub const TASK_SCHEMA: &str = "/v2/schemas/task";

/// Header carrying the pre-issued authentication token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Image properties an import task may set. Anything else fails the task.
pub const ALLOWED_IMAGE_PROPERTIES: &[&str] = &["name"];

/// Status code the service returns when it accepts a task.
pub const TASK_CREATED_STATUS: u16 = 201;

/// How long the service keeps a finished task before it expires (48 hours).
pub const TASK_TIME_TO_LIVE_SECS: i64 = 48 * 60 * 60;

/// Default image service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9292";

/// Default source the import scenarios pull from.
pub const DEFAULT_IMPORT_FROM: &str = "http://localhost:8080/cirros.qcow2";

/// Default interval between task polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Default upper bound on a single wait for task status, in seconds.
pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 900;

/// Default per-request HTTP timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of consecutive transport failures tolerated while polling.
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 3;

/// Default page size used when listing all images.
pub const DEFAULT_LIST_PAGE_SIZE: u32 = 100;

/// Default number of tasks submitted back-to-back by the simultaneous scenario.
pub const DEFAULT_SIMULTANEOUS_TASKS: usize = 5;

/// Default tolerated drift between submission and `created_at`, in seconds.
pub const DEFAULT_MAX_CREATED_AT_DELTA_SECS: i64 = 60;

/// Default tolerated drift between submission and `updated_at`, in seconds.
pub const DEFAULT_MAX_UPDATED_AT_DELTA_SECS: i64 = 3600;

/// Default tolerated drift between submission and `expires_at`, in seconds.
pub const DEFAULT_MAX_EXPIRES_AT_DELTA_SECS: i64 = TASK_TIME_TO_LIVE_SECS + 3600;

/// Failure message the service reports for forbidden image properties.
pub const DEFAULT_EXTRA_IMAGE_PROPERTIES_MSG: &str =
    "Image properties other than name are not allowed";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "taskcheck";

/// Returns the `self` link the service assigns to a task.
#[must_use]
pub fn task_self_link(task_id: &str) -> String {
    format!("{TASKS_PATH}/{task_id}")
}

/// Returns whether `key` may appear in an import task's `image_properties`.
#[must_use]
pub fn is_allowed_image_property(key: &str) -> bool {
    ALLOWED_IMAGE_PROPERTIES.contains(&key)
}
