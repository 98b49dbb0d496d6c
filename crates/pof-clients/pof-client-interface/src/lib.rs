pub mod error;
pub mod types;

use async_trait::async_trait;
use mockall::automock;

pub use crate::error::{ClientError, Operation, TransportError};
pub use crate::types::{CommitmentAck, CommitmentRequest, DealInfo, JobHandle, JobStatus, ProofRequest, ProofResult};

/// Describes the calls a proof-of-funds backend client has to support.
///
/// Every method performs exactly one round trip to the backend: no caching, no retries.
#[automock]
#[async_trait]
pub trait ProofOfFundsClient: Send + Sync {
    /// Pledges funds from a bank. The acknowledgment body is backend-defined.
    async fn create_commitment(&self, request: &CommitmentRequest) -> Result<CommitmentAck, ClientError>;

    /// Generates a proof and waits for it in the same call.
    async fn generate_proof_sync(&self, request: &ProofRequest) -> Result<ProofResult, ClientError>;

    /// Submits a proof-generation job.
    ///
    /// # Returns
    ///
    /// The handle of the job. It can be used with [`ProofOfFundsClient::check_job_status`]
    /// to track the job until it reaches a terminal status.
    async fn generate_proof_async(&self, request: &ProofRequest) -> Result<JobHandle, ClientError>;

    /// Fetches the current status of a job. An unknown job id is a [`ClientError::Transport`].
    async fn check_job_status(&self, job_id: &str) -> Result<JobStatus, ClientError>;

    /// Verifies the stored proof for a deal.
    async fn verify_proof(&self, deal_id: &str) -> Result<ProofResult, ClientError>;
}
