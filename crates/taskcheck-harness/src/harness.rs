//! The import harness that scenarios drive.

use taskcheck_client::api::ImagesApi;
use taskcheck_client::source;
use taskcheck_common::config::HarnessConfig;
use taskcheck_common::error::{HarnessError, Result};
use taskcheck_common::types::{Image, ImageId, ImportInput, Task, TaskId, TaskStatus, TaskType};

use crate::poll::{self, PollSettings};
use crate::submit;

/// Ties an image service to the configuration a run uses.
///
/// Holds no state between calls: each scenario owns the task ids it
/// creates and the harness only forwards requests and applies policy.
pub struct ImportHarness {
    api: Box<dyn ImagesApi>,
    config: HarnessConfig,
    poll: PollSettings,
}

impl ImportHarness {
    /// Creates a harness after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or `import_from`
    /// uses an unsupported scheme.
    pub fn new(api: Box<dyn ImagesApi>, config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        let import_source = source::resolve_source(&config.import_from)?;
        tracing::info!(endpoint = config.base_url(), source = %import_source, "import harness ready");
        let poll = PollSettings::from_config(&config);
        Ok(Self { api, config, poll })
    }

    /// Overrides the polling policy derived from the configuration.
    #[must_use]
    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Returns the underlying service.
    #[must_use]
    pub fn api(&self) -> &dyn ImagesApi {
        self.api.as_ref()
    }

    /// Returns an import input for the configured source with no properties.
    #[must_use]
    pub fn import_input(&self) -> ImportInput {
        ImportInput::new(self.config.import_from.clone())
    }

    /// Submits an import task, requiring HTTP 201.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Protocol` if the service does not accept it.
    pub fn submit_import(&self, input: &ImportInput) -> Result<Task> {
        submit::submit_accepted(self.api(), input, TaskType::Import)
    }

    /// Blocks until the task reaches `desired`.
    ///
    /// # Errors
    ///
    /// See [`poll::wait_for_status`].
    pub fn wait_for_task_status(&self, task_id: &TaskId, desired: TaskStatus) -> Result<Task> {
        poll::wait_for_status(self.api(), task_id, desired, &self.poll)
    }

    /// Fetches image details, requiring HTTP 200.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the image is not returned.
    pub fn image_details(&self, image_id: &ImageId) -> Result<Image> {
        self.api.get_image(image_id)?.expect_status(200, "get image")
    }

    /// Lists every image, following pagination to the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub fn list_all_images(&self) -> Result<Vec<Image>> {
        let mut images = Vec::new();
        let mut marker: Option<ImageId> = None;
        loop {
            let page = self
                .api
                .list_images(self.config.list_page_size, marker.as_ref())?
                .expect_status(200, "list images")?;
            let has_next = page.next.is_some();
            let Some(last) = page.images.last() else {
                break;
            };
            if marker.as_ref() == Some(&last.id) {
                return Err(HarnessError::Assertion {
                    message: format!("image listing repeated marker {}", last.id),
                });
            }
            marker = Some(last.id.clone());
            images.extend(page.images);
            if !has_next {
                break;
            }
        }
        tracing::debug!(count = images.len(), "listed all images");
        Ok(images)
    }
}

impl std::fmt::Debug for ImportHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportHarness")
            .field("config", &self.config)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use taskcheck_client::simulated::SimulatedImageService;

    use super::*;

    fn config() -> HarnessConfig {
        HarnessConfig {
            poll_interval_secs: 0,
            list_page_size: 2,
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn new_rejects_unsupported_import_source() {
        let config = HarnessConfig {
            import_from: "ftp://host/img".into(),
            ..config()
        };
        let err = ImportHarness::new(Box::new(SimulatedImageService::default()), config).unwrap_err();
        assert!(matches!(err, HarnessError::Config { .. }));
    }

    #[test]
    fn list_all_images_follows_every_page() {
        let service = SimulatedImageService::default();
        let seeded: Vec<ImageId> = (0..5)
            .map(|i| service.seed_image(&format!("img-{i}")).expect("seed failed"))
            .collect();
        let harness = ImportHarness::new(Box::new(service), config()).expect("harness");

        let listed: Vec<ImageId> = harness
            .list_all_images()
            .expect("list failed")
            .into_iter()
            .map(|image| image.id)
            .collect();
        assert_eq!(listed, seeded);
    }

    #[test]
    fn list_all_images_on_empty_service_is_empty() {
        let harness =
            ImportHarness::new(Box::new(SimulatedImageService::default()), config()).expect("harness");
        assert!(harness.list_all_images().expect("list failed").is_empty());
    }

    #[test]
    fn image_details_for_missing_image_is_protocol_error() {
        let harness =
            ImportHarness::new(Box::new(SimulatedImageService::default()), config()).expect("harness");
        let err = harness.image_details(&ImageId::new("missing")).unwrap_err();
        assert!(matches!(err, HarnessError::Protocol { actual: 404, .. }));
    }

    #[test]
    fn submit_then_wait_reaches_success() {
        let harness =
            ImportHarness::new(Box::new(SimulatedImageService::default()), config()).expect("harness");
        let task = harness.submit_import(&harness.import_input()).expect("submit failed");
        let done = harness
            .wait_for_task_status(&task.id, TaskStatus::Success)
            .expect("wait failed");
        assert_eq!(done.id, task.id);
        assert!(done.image_id().is_some());
    }
}
