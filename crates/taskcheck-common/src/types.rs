//! Domain types exchanged with the image service.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Unique identifier the service assigns to a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random task ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    /// Creates an image ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random image ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a task.
///
/// Tasks move `Queued -> Processing -> {Success, Failure}`. Both `Success`
/// and `Failure` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted but not yet picked up.
    #[serde(alias = "pending")]
    Queued,
    /// The import is running.
    Processing,
    /// The import finished and produced an image.
    Success,
    /// The import was rejected or crashed.
    Failure,
}

impl TaskStatus {
    /// Returns whether no further transitions can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queued" | "pending" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(HarnessError::Config {
                message: format!("unknown task status: {other}"),
            }),
        }
    }
}

/// Kind of work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Import an image from an external source.
    Import,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
        }
    }
}

/// Input body of an import task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportInput {
    /// Properties applied to the produced image.
    #[serde(default)]
    pub image_properties: BTreeMap<String, serde_json::Value>,
    /// URI the service imports the image data from.
    pub import_from: String,
}

impl ImportInput {
    /// Creates an input with no image properties.
    #[must_use]
    pub fn new(import_from: impl Into<String>) -> Self {
        Self {
            image_properties: BTreeMap::new(),
            import_from: import_from.into(),
        }
    }

    /// Adds an image property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let _ = self.image_properties.insert(key.into(), value.into());
        self
    }

    /// Returns the property keys the service will reject.
    #[must_use]
    pub fn forbidden_properties(&self) -> Vec<&str> {
        self.image_properties
            .keys()
            .map(String::as_str)
            .filter(|key| !crate::constants::is_allowed_image_property(key))
            .collect()
    }
}

/// Body of a task-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Task type.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Task input.
    pub input: ImportInput,
}

/// Result payload of a successful import task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Image produced by the import.
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

/// Task representation as returned by the service.
///
/// Every field except `id` and `status` is optional so that a malformed
/// representation still decodes and can be reported by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Task type.
    #[serde(rename = "type", default)]
    pub task_type: Option<TaskType>,
    /// Current status.
    pub status: TaskStatus,
    /// Tenant that owns the task.
    #[serde(default)]
    pub owner: Option<String>,
    /// Echo of the submitted input.
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    /// Result payload, present once an import succeeds.
    #[serde(default)]
    pub result: Option<TaskResult>,
    /// Failure diagnostic, present once a task fails.
    #[serde(default)]
    pub message: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Expiry timestamp, set once the task is terminal.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Link to this task.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
    /// Link to the task schema.
    #[serde(default)]
    pub schema: Option<String>,
}

impl Task {
    /// Returns the image produced by a successful import, if any.
    #[must_use]
    pub fn image_id(&self) -> Option<&ImageId> {
        self.result.as_ref().and_then(|r| r.image_id.as_ref())
    }
}

/// Image representation as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image identifier.
    pub id: ImageId,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Image status (`queued`, `active`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Tenant that owns the image.
    #[serde(default)]
    pub owner: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of the image listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePage {
    /// Images on this page.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Link to the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// A single property mismatch found during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the checked property.
    pub field: String,
    /// Expected value or bound.
    pub expected: String,
    /// Observed value.
    pub received: String,
}

impl Violation {
    /// Creates a violation record.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        expected: impl fmt::Display,
        received: impl fmt::Display,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.to_string(),
            received: received.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unexpected {} value received. Expected: {} Received: {}",
            self.field, self.expected, self.received
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK_JSON: &str = r#"{
        "id": "2f6a7c3e-9f2b-4c1d-8d7e-1a2b3c4d5e6f",
        "type": "import",
        "status": "success",
        "owner": "tenant-1",
        "input": {"image_properties": {}, "import_from": "http://host/img.qcow2"},
        "result": {"image_id": "img-1"},
        "message": "",
        "created_at": "2015-03-01T10:00:00Z",
        "updated_at": "2015-03-01T10:00:05Z",
        "expires_at": "2015-03-03T10:00:05Z",
        "self": "/v2/tasks/2f6a7c3e-9f2b-4c1d-8d7e-1a2b3c4d5e6f",
        "schema": "/v2/schemas/task"
    }"#;

    #[test]
    fn task_decodes_service_representation() {
        let task: Task = serde_json::from_str(TASK_JSON).expect("decode failed");
        assert_eq!(task.status, TaskStatus::Success);
        assert_eq!(task.task_type, Some(TaskType::Import));
        assert_eq!(task.owner.as_deref(), Some("tenant-1"));
        assert_eq!(task.image_id(), Some(&ImageId::new("img-1")));
        assert_eq!(task.schema.as_deref(), Some("/v2/schemas/task"));
        assert!(task.created_at.is_some());
    }

    #[test]
    fn task_decodes_with_only_required_fields() {
        let task: Task =
            serde_json::from_str(r#"{"id": "t-1", "status": "processing"}"#).expect("decode failed");
        assert_eq!(task.status, TaskStatus::Processing);
        assert!(task.owner.is_none());
        assert!(task.image_id().is_none());
    }

    #[test]
    fn pending_wire_status_maps_to_queued() {
        let task: Task =
            serde_json::from_str(r#"{"id": "t-1", "status": "pending"}"#).expect("decode failed");
        assert_eq!(task.status, TaskStatus::Queued);
    }

    #[test]
    fn only_success_and_failure_are_terminal() {
        assert!(!TaskStatus::Queued.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failure.is_terminal());
    }

    #[test]
    fn task_status_parses_case_insensitively() {
        assert_eq!("SUCCESS".parse::<TaskStatus>().ok(), Some(TaskStatus::Success));
        assert_eq!("Failure".parse::<TaskStatus>().ok(), Some(TaskStatus::Failure));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn create_request_serializes_type_field() {
        let request = CreateTaskRequest {
            task_type: TaskType::Import,
            input: ImportInput::new("http://host/img.qcow2").with_property("name", "img"),
        };
        let value = serde_json::to_value(&request).expect("encode failed");
        assert_eq!(value["type"], "import");
        assert_eq!(value["input"]["image_properties"]["name"], "img");
        assert_eq!(value["input"]["import_from"], "http://host/img.qcow2");
    }

    #[test]
    fn forbidden_properties_lists_non_name_keys() {
        let input = ImportInput::new("http://host/img")
            .with_property("name", "ok")
            .with_property("image_type", "import");
        assert_eq!(input.forbidden_properties(), vec!["image_type"]);
    }

    #[test]
    fn generated_task_ids_are_distinct() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    #[test]
    fn violation_formats_property_message() {
        let v = Violation::new("owner", "tenant-1", "tenant-2");
        assert_eq!(
            v.to_string(),
            "Unexpected owner value received. Expected: tenant-1 Received: tenant-2"
        );
    }
}
