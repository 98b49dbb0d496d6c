use clap::Args;
use pof_http_client::{DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT};
use url::Url;

/// Parameters used to reach the proof-of-funds backend.
#[derive(Debug, Clone, Args)]
pub struct BackendCliArgs {
    /// Base URL of the proof-of-funds backend.
    #[arg(env = "POF_BACKEND_URL", long, default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: Url,

    /// Client-side timeout of a single backend request, in seconds.
    #[arg(env = "POF_REQUEST_TIMEOUT_SECS", long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,
}
