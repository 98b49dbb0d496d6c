use std::time::Duration;

use clap::Parser;
use pof_http_client::PofHttpValidatedArgs;

use crate::config::PollingParams;
use crate::telemetry::InstrumentationParams;

pub mod backend;
pub mod command;
pub mod instrumentation;
pub mod polling;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    // Backend
    #[clap(flatten)]
    pub backend_args: backend::BackendCliArgs,

    // Polling
    #[clap(flatten)]
    pub polling_args: polling::PollingCliArgs,

    // Instrumentation
    #[clap(flatten)]
    pub instrumentation_args: instrumentation::InstrumentationCliArgs,

    #[command(subcommand)]
    pub command: command::Command,
}

impl RunCmd {
    pub fn validate_backend_params(&self) -> Result<PofHttpValidatedArgs, String> {
        if self.backend_args.backend_url.cannot_be_a_base() {
            return Err(format!("Backend URL {} cannot be used as a base URL", self.backend_args.backend_url));
        }
        if self.backend_args.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than zero".to_string());
        }
        Ok(PofHttpValidatedArgs::new(
            self.backend_args.backend_url.clone(),
            Duration::from_secs(self.backend_args.request_timeout_secs),
        ))
    }

    pub fn validate_polling_params(&self) -> Result<PollingParams, String> {
        if self.polling_args.poll_interval_ms == 0 {
            return Err("Poll interval must be greater than zero".to_string());
        }
        Ok(PollingParams { poll_interval: Duration::from_millis(self.polling_args.poll_interval_ms) })
    }

    pub fn validate_instrumentation_params(&self) -> Result<InstrumentationParams, String> {
        Ok(InstrumentationParams {
            otel_service_name: self.instrumentation_args.otel_service_name.clone(),
            otel_collector_endpoint: self.instrumentation_args.otel_collector_endpoint.clone(),
            log_level: self.instrumentation_args.log_level,
        })
    }
}
