/// Contains the CLI arguments for the service
pub mod cli;
/// Runs the CLI subcommands against the backend
pub mod commands;
/// Config of the service. Contains the backend client and polling settings
pub mod config;
/// Contains the constants used in the service
pub mod constants;
/// Contains the job lifecycle controller of async proof jobs
pub mod jobs;
/// Contains the metrics of the service
pub mod metrics;
/// Contains the tracing and OpenTelemetry setup
pub mod telemetry;

#[cfg(test)]
pub mod tests;
