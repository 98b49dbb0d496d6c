use clap::{Args, Subcommand};

use crate::constants::{DEMO_DEAL_ID, DEMO_REQUIRED_AMOUNT};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a bank balance commitment.
    Commit(CommitArgs),
    /// Generate a proof of funds, synchronously or as a polled async job.
    Prove(ProveArgs),
    /// Check the status of an async proof job once.
    Status(StatusArgs),
    /// Verify the proof stored for a deal.
    Verify(VerifyArgs),
    /// Commit two balances, prove them through an async job and verify the result.
    Demo(DemoArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CommitArgs {
    #[arg(long)]
    pub bank_index: u64,

    #[arg(long)]
    pub amount: u64,

    #[arg(long)]
    pub deal_id: Option<String>,

    #[arg(long)]
    pub buyer: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ProveArgs {
    #[arg(long)]
    pub required_amount: u64,

    #[arg(long)]
    pub deal_id: String,

    /// Submit an async job and poll it until it finishes instead of waiting on the sync endpoint.
    #[arg(long, default_value_t = false)]
    pub wait_async: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub job_id: String,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[arg(long)]
    pub deal_id: String,
}

#[derive(Debug, Clone, Args)]
pub struct DemoArgs {
    #[arg(long, default_value = DEMO_DEAL_ID)]
    pub deal_id: String,

    #[arg(long, default_value_t = DEMO_REQUIRED_AMOUNT)]
    pub required_amount: u64,
}
