//! Image service abstraction.

use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{CreateTaskRequest, Image, ImageId, ImagePage, Task, TaskId};

/// Status code and decoded body of one service call.
///
/// The entity is only decoded for successful responses, so callers can
/// inspect the status of a rejected request without a parse failure
/// masking it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body, present for 2xx responses.
    pub entity: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response carrying an entity.
    #[must_use]
    pub const fn ok(status: u16, entity: T) -> Self {
        Self {
            status,
            entity: Some(entity),
        }
    }

    /// Creates a response without a body.
    #[must_use]
    pub const fn empty(status: u16) -> Self {
        Self {
            status,
            entity: None,
        }
    }

    /// Returns whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the entity if the status matches `expected`.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Protocol` if the status differs, or
    /// `HarnessError::Assertion` if a matching response carried no body.
    pub fn expect_status(self, expected: u16, operation: &str) -> Result<T> {
        if self.status != expected {
            return Err(HarnessError::Protocol {
                operation: operation.to_string(),
                expected,
                actual: self.status,
            });
        }
        self.entity.ok_or_else(|| HarnessError::Assertion {
            message: format!("{operation}: HTTP {expected} response had no body"),
        })
    }
}

/// Operations the harness needs from the image service.
///
/// Implementors perform one request per call and never retry; retry policy
/// belongs to the caller.
pub trait ImagesApi: Send + Sync {
    /// Submits a task-creation request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or a 2xx body does not
    /// decode. Non-2xx statuses are reported through the response.
    fn create_task(&self, request: &CreateTaskRequest) -> Result<ApiResponse<Task>>;

    /// Fetches the current representation of a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or a 2xx body does not
    /// decode.
    fn get_task(&self, id: &TaskId) -> Result<ApiResponse<Task>>;

    /// Fetches image details.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or a 2xx body does not
    /// decode.
    fn get_image(&self, id: &ImageId) -> Result<ApiResponse<Image>>;

    /// Fetches one page of the image listing, starting after `marker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or a 2xx body does not
    /// decode.
    fn list_images(&self, limit: u32, marker: Option<&ImageId>) -> Result<ApiResponse<ImagePage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_status_returns_entity_on_match() {
        let response = ApiResponse::ok(201, "task");
        assert_eq!(response.expect_status(201, "create task").expect("match"), "task");
    }

    #[test]
    fn expect_status_reports_protocol_error_on_mismatch() {
        let response: ApiResponse<&str> = ApiResponse::empty(400);
        let err = response.expect_status(201, "create task").unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Protocol {
                expected: 201,
                actual: 400,
                ..
            }
        ));
    }

    #[test]
    fn expect_status_rejects_missing_body() {
        let response: ApiResponse<&str> = ApiResponse::empty(200);
        assert!(matches!(
            response.expect_status(200, "get task"),
            Err(HarnessError::Assertion { .. })
        ));
    }

    #[test]
    fn is_success_covers_2xx_only() {
        assert!(ApiResponse::<()>::empty(200).is_success());
        assert!(ApiResponse::<()>::empty(201).is_success());
        assert!(!ApiResponse::<()>::empty(301).is_success());
        assert!(!ApiResponse::<()>::empty(404).is_success());
    }
}
