pub mod backend;
pub mod mock_server;

use std::sync::Arc;
use std::time::Duration;

pub use backend::PofBackend;
pub use mock_server::MockServerGlobal;
use pof_http_client::PofHttpValidatedArgs;
use pof_orchestrator::config::{build_pof_client, Config, PollingParams};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the orchestrator config against a running backend.
pub fn build_config(backend_url: &str, poll_interval: Duration) -> color_eyre::Result<Arc<Config>> {
    let backend_params = PofHttpValidatedArgs::new(Url::parse(backend_url)?, REQUEST_TIMEOUT);
    let client = build_pof_client(&backend_params)?;
    Ok(Arc::new(Config::new(client, PollingParams { poll_interval })))
}
