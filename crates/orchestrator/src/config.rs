use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::eyre;
use pof_client_interface::ProofOfFundsClient;
use pof_http_client::{PofHttpService, PofHttpValidatedArgs};

use crate::cli::RunCmd;
use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::jobs::JobLifecycleController;

/// The app config. Holds the backend client shared by every command.
pub struct Config {
    /// The proof-of-funds backend client
    client: Arc<dyn ProofOfFundsClient>,
    polling: PollingParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingParams {
    pub poll_interval: Duration,
}

impl Default for PollingParams {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS) }
    }
}

/// Initializes the app config
pub fn init_config(run_cmd: &RunCmd) -> color_eyre::Result<Arc<Config>> {
    // init backend client
    let backend_params =
        run_cmd.validate_backend_params().map_err(|e| eyre!("Failed to validate backend params: {e}"))?;
    let client = build_pof_client(&backend_params)?;

    // init polling
    let polling = run_cmd.validate_polling_params().map_err(|e| eyre!("Failed to validate polling params: {e}"))?;

    Ok(Arc::new(Config::new(client, polling)))
}

impl Config {
    pub fn new(client: Arc<dyn ProofOfFundsClient>, polling: PollingParams) -> Self {
        Self { client, polling }
    }

    pub fn client(&self) -> &Arc<dyn ProofOfFundsClient> {
        &self.client
    }

    /// A fresh controller over the configured client and poll interval.
    pub fn job_controller(&self) -> JobLifecycleController {
        JobLifecycleController::new(self.client.clone(), self.polling.poll_interval)
    }
}

/// Builds the HTTP backed proof-of-funds client
pub fn build_pof_client(backend_params: &PofHttpValidatedArgs) -> color_eyre::Result<Arc<dyn ProofOfFundsClient>> {
    let service =
        PofHttpService::new_with_args(backend_params).map_err(|e| eyre!("Failed to build backend client: {e}"))?;
    Ok(Arc::new(service))
}
