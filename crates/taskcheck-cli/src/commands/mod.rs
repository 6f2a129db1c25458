//! CLI command definitions and dispatch.

pub mod images;
pub mod run;
pub mod submit;
pub mod wait;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskcheck_client::api::ImagesApi;
use taskcheck_client::http::HttpImagesClient;
use taskcheck_client::simulated::{SimulatedImageService, SimulatorOptions};
use taskcheck_common::config::HarnessConfig;
use taskcheck_common::constants::BIN_NAME;
use taskcheck_harness::ImportHarness;

/// taskcheck — Import-task checks for an image service.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to a JSON configuration file.
    #[arg(long, global = true, env = "TASKCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Image service base URL.
    #[arg(long, global = true, env = "TASKCHECK_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Pre-issued authentication token.
    #[arg(long, global = true, env = "TASKCHECK_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Tenant the token belongs to.
    #[arg(long, global = true, env = "TASKCHECK_TENANT_ID")]
    pub tenant: Option<String>,

    /// Source URI imports pull from.
    #[arg(long, global = true, env = "TASKCHECK_IMPORT_FROM")]
    pub import_from: Option<String>,

    /// Run against an in-process simulated service instead of the endpoint.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the import-task scenario suite.
    Run(run::RunArgs),
    /// Submit a single import task.
    Submit(submit::SubmitArgs),
    /// Wait for a task to reach a status.
    Wait(wait::WaitArgs),
    /// List every image on the service.
    Images(images::ImagesArgs),
}

impl Cli {
    /// Loads the configuration file (if any) and applies flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the result is invalid.
    pub fn harness_config(&self) -> anyhow::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(token) = &self.token {
            config.auth_token.clone_from(token);
        }
        if let Some(tenant) = &self.tenant {
            config.tenant_id.clone_from(tenant);
        }
        if let Some(import_from) = &self.import_from {
            config.import_from.clone_from(import_from);
        }
        if self.dry_run {
            // The simulator advances on every poll.
            config.poll_interval_secs = 0;
            if config.tenant_id.is_empty() {
                config.tenant_id = SimulatorOptions::default().owner;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Builds the harness for the selected service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn harness(&self) -> anyhow::Result<ImportHarness> {
        let config = self.harness_config()?;
        let api: Box<dyn ImagesApi> = if self.dry_run {
            tracing::info!("using simulated image service");
            Box::new(SimulatedImageService::new(SimulatorOptions {
                owner: config.tenant_id.clone(),
                extra_properties_message: config.extra_image_properties_message.clone(),
                ..SimulatorOptions::default()
            }))
        } else {
            Box::new(HttpImagesClient::new(&config)?)
        };
        Ok(ImportHarness::new(api, config)?)
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let harness = cli.harness()?;
    match cli.command {
        Command::Run(args) => run::execute(&harness, args),
        Command::Submit(args) => submit::execute(&harness, args),
        Command::Wait(args) => wait::execute(&harness, args),
        Command::Images(args) => images::execute(&harness, args),
    }
}
