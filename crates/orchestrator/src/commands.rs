use std::future::Future;

use color_eyre::eyre::eyre;
use pof_client_interface::{CommitmentRequest, JobHandle, JobStatus, ProofRequest};
use serde_json::{json, Value};

use crate::cli::command::{CommitArgs, Command, DemoArgs, ProveArgs, StatusArgs, VerifyArgs};
use crate::config::Config;
use crate::constants::DEMO_COMMITMENTS;
use crate::jobs::{wait_for_outcome, JobLifecycleController};

/// Runs one CLI command and returns the JSON document to print.
///
/// `interrupt` resolving while an async proof job is being waited on stops polling and fails the
/// command.
pub async fn run_command(
    command: &Command,
    config: &Config,
    interrupt: impl Future<Output = ()>,
) -> color_eyre::Result<Value> {
    match command {
        Command::Commit(args) => commit(config, args).await,
        Command::Prove(args) => prove(config, args, interrupt).await,
        Command::Status(args) => status(config, args).await,
        Command::Verify(args) => verify(config, args).await,
        Command::Demo(args) => demo(config, args, interrupt).await,
    }
}

async fn commit(config: &Config, args: &CommitArgs) -> color_eyre::Result<Value> {
    let mut request = CommitmentRequest::new(args.bank_index, args.amount);
    if let Some(deal_id) = &args.deal_id {
        request = request.with_deal_id(deal_id.clone());
    }
    if let Some(buyer) = &args.buyer {
        request = request.with_buyer(buyer.clone());
    }

    let ack = config.client().create_commitment(&request).await?;
    Ok(serde_json::to_value(ack)?)
}

async fn prove(config: &Config, args: &ProveArgs, interrupt: impl Future<Output = ()>) -> color_eyre::Result<Value> {
    let request = ProofRequest::new(args.required_amount, args.deal_id.clone());

    if !args.wait_async {
        let proof = config.client().generate_proof_sync(&request).await?;
        return Ok(serde_json::to_value(proof)?);
    }

    let controller = config.job_controller();
    let (handle, status) = submit_and_wait(&controller, &request, interrupt).await?;
    Ok(json!({ "job": handle, "outcome": status }))
}

async fn status(config: &Config, args: &StatusArgs) -> color_eyre::Result<Value> {
    let status = config.client().check_job_status(&args.job_id).await?;
    Ok(serde_json::to_value(status)?)
}

async fn verify(config: &Config, args: &VerifyArgs) -> color_eyre::Result<Value> {
    let proof = config.client().verify_proof(&args.deal_id).await?;
    Ok(serde_json::to_value(proof)?)
}

/// Commitments, an async proof job polled to completion, then verification of the deal.
async fn demo(config: &Config, args: &DemoArgs, interrupt: impl Future<Output = ()>) -> color_eyre::Result<Value> {
    let mut commitments = Vec::with_capacity(DEMO_COMMITMENTS.len());
    for (bank_index, amount) in DEMO_COMMITMENTS {
        let ack = config.client().create_commitment(&CommitmentRequest::new(bank_index, amount)).await?;
        tracing::info!(category = "demo", bank_index, amount, "Commitment registered.");
        commitments.push(ack);
    }

    let controller = config.job_controller();
    let request = ProofRequest::new(args.required_amount, args.deal_id.clone());
    let (handle, status) = submit_and_wait(&controller, &request, interrupt).await?;

    if let JobStatus::Failed(message) = &status {
        return Err(eyre!("Proof job {} failed: {}", handle.job_id, message));
    }

    let verification = config.client().verify_proof(&args.deal_id).await?;
    Ok(json!({
        "commitments": commitments,
        "job": handle,
        "outcome": status,
        "verification": verification,
    }))
}

/// Submits `request` through the controller and waits for the job's terminal status.
pub async fn submit_and_wait(
    controller: &JobLifecycleController,
    request: &ProofRequest,
    interrupt: impl Future<Output = ()>,
) -> color_eyre::Result<(JobHandle, JobStatus)> {
    // subscribe first so the first periodic check cannot be missed
    let mut events = controller.subscribe();
    let handle = controller.start_job(request).await?;

    tokio::select! {
        outcome = wait_for_outcome(&mut events, &handle.job_id) => {
            let status = outcome?;
            Ok((handle, status))
        }
        _ = interrupt => {
            controller.stop_polling();
            Err(eyre!("Interrupted while waiting for proof job {}, polling stopped", handle.job_id))
        }
    }
}
