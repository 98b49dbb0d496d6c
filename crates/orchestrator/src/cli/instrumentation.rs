use clap::Args;
use tracing::Level;
use url::Url;

use crate::constants::DEFAULT_OTEL_SERVICE_NAME;

/// Parameters used to config instrumentation.
#[derive(Debug, Clone, Args)]
pub struct InstrumentationCliArgs {
    /// The name of the instrumentation service.
    #[arg(env = "OTEL_SERVICE_NAME", long, default_value = DEFAULT_OTEL_SERVICE_NAME)]
    pub otel_service_name: String,

    /// The endpoint of the collector. Traces and metrics are only exported when set.
    #[arg(env = "OTEL_COLLECTOR_ENDPOINT", long)]
    pub otel_collector_endpoint: Option<Url>,

    /// The log level.
    #[arg(env = "RUST_LOG", long, default_value = "INFO")]
    pub log_level: Level,
}
