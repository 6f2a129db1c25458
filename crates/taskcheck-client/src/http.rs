//! Blocking HTTP client for a live image service.

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use taskcheck_common::config::HarnessConfig;
use taskcheck_common::constants::{AUTH_TOKEN_HEADER, IMAGES_PATH, TASKS_PATH};
use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{CreateTaskRequest, Image, ImageId, ImagePage, Task, TaskId};

use crate::api::{ApiResponse, ImagesApi};

/// `ImagesApi` backed by `reqwest`'s blocking client.
#[derive(Debug, Clone)]
pub struct HttpImagesClient {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl HttpImagesClient {
    /// Builds a client from the harness configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| HarnessError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        tracing::debug!(endpoint = config.base_url(), "image service client ready");
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(AUTH_TOKEN_HEADER, &self.auth_token)
            .header(ACCEPT, "application/json")
    }

    fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &str,
    ) -> Result<ApiResponse<T>> {
        let response = builder.send().map_err(|e| HarnessError::Transport {
            operation: operation.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| HarnessError::Transport {
            operation: operation.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;

        let rejected = ApiResponse::empty(status);
        if !rejected.is_success() {
            tracing::debug!(operation, status, body = %body, "non-success response");
            return Ok(rejected);
        }

        let entity = serde_json::from_str(&body).map_err(|e| HarnessError::Decode {
            context: format!("{operation} response"),
            source: e,
        })?;
        Ok(ApiResponse::ok(status, entity))
    }
}

impl ImagesApi for HttpImagesClient {
    fn create_task(&self, request: &CreateTaskRequest) -> Result<ApiResponse<Task>> {
        tracing::debug!(task_type = %request.task_type, import_from = %request.input.import_from, "POST task");
        self.execute(self.request(Method::POST, TASKS_PATH).json(request), "create task")
    }

    fn get_task(&self, id: &TaskId) -> Result<ApiResponse<Task>> {
        let path = format!("{TASKS_PATH}/{id}");
        self.execute(self.request(Method::GET, &path), "get task")
    }

    fn get_image(&self, id: &ImageId) -> Result<ApiResponse<Image>> {
        let path = format!("{IMAGES_PATH}/{id}");
        self.execute(self.request(Method::GET, &path), "get image")
    }

    fn list_images(&self, limit: u32, marker: Option<&ImageId>) -> Result<ApiResponse<ImagePage>> {
        let mut builder = self
            .request(Method::GET, IMAGES_PATH)
            .query(&[("limit", limit.to_string())]);
        if let Some(marker) = marker {
            builder = builder.query(&[("marker", marker.as_str())]);
        }
        self.execute(builder, "list images")
    }
}
