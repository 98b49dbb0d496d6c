use clap::Parser as _;
use color_eyre::eyre::eyre;
use dotenvy::dotenv;
use pof_orchestrator::cli::RunCmd;
use pof_orchestrator::commands::run_command;
use pof_orchestrator::config::init_config;
use pof_orchestrator::telemetry::setup_analytics;

/// Run one proof-of-funds command
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    color_eyre::install()?;

    let run_cmd = RunCmd::parse();

    let instrumentation_params = run_cmd
        .validate_instrumentation_params()
        .map_err(|e| eyre!("Failed to validate instrumentation params: {e}"))?;
    let analytics = setup_analytics(&instrumentation_params)?;

    // initial config setup
    let config = init_config(&run_cmd)?;

    let interrupt = async {
        // without a signal handler the command simply runs to completion
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::warn!("Received Ctrl-C, stopping");
    };

    let result = run_command(&run_cmd.command, &config, interrupt).await;
    if let Ok(output) = &result {
        println!("{}", serde_json::to_string_pretty(output)?);
    }

    analytics.shutdown()?;
    result.map(|_| ())
}
