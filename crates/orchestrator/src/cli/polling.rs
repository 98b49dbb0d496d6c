use clap::Args;

use crate::constants::DEFAULT_POLL_INTERVAL_MS;

#[derive(Debug, Clone, Args)]
pub struct PollingCliArgs {
    /// Delay between two status checks of an async proof job, in milliseconds.
    #[arg(env = "POF_POLL_INTERVAL_MS", long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
}
