use std::time::Duration;

use url::Url;

/// Backend address used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3030";

/// Upper bound on a single backend round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PofHttpValidatedArgs {
    pub backend_url: Url,
    pub request_timeout: Duration,
}

impl PofHttpValidatedArgs {
    pub fn new(backend_url: Url, request_timeout: Duration) -> Self {
        Self { backend_url, request_timeout }
    }
}

impl Default for PofHttpValidatedArgs {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend url is valid"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
