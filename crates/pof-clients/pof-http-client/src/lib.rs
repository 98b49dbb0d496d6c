pub mod client;
pub mod config;
pub mod error;
pub mod types;

use async_trait::async_trait;
use pof_client_interface::{
    ClientError, CommitmentAck, CommitmentRequest, JobHandle, JobStatus, Operation, ProofOfFundsClient, ProofRequest,
    ProofResult,
};

use crate::client::PofBackendClient;
pub use crate::config::{PofHttpValidatedArgs, DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT};
pub use crate::error::PofHttpError;
use crate::types::{ProofBody, VerifyBody};

/// [`ProofOfFundsClient`] backed by the proof-of-funds HTTP API.
#[derive(Debug, Clone)]
pub struct PofHttpService {
    backend_client: PofBackendClient,
}

#[async_trait]
impl ProofOfFundsClient for PofHttpService {
    #[tracing::instrument(skip(self, request), fields(bank_index = request.bank_index))]
    async fn create_commitment(&self, request: &CommitmentRequest) -> Result<CommitmentAck, ClientError> {
        request.validate()?;
        let ack = self.backend_client.create_commitment(request).await?;
        tracing::info!(category = "transport", function_type = "create_commitment", "Commitment created.");
        Ok(CommitmentAck(ack))
    }

    #[tracing::instrument(skip(self, request), fields(deal_id = %request.deal_id))]
    async fn generate_proof_sync(&self, request: &ProofRequest) -> Result<ProofResult, ClientError> {
        request.validate()?;
        let body = ProofBody { required_amount: request.required_amount, deal_id: &request.deal_id };
        let response = self.backend_client.generate_proof(&body).await?;
        Ok(response.into_proof_result(Operation::GenerateProofSync)?)
    }

    #[tracing::instrument(skip(self, request), fields(deal_id = %request.deal_id))]
    async fn generate_proof_async(&self, request: &ProofRequest) -> Result<JobHandle, ClientError> {
        request.validate()?;
        let body = ProofBody { required_amount: request.required_amount, deal_id: &request.deal_id };
        let response = self.backend_client.add_job(&body).await?;

        let job_id = response
            .job_id
            .filter(|id| !id.is_empty())
            .ok_or(PofHttpError::MissingField { operation: Operation::GenerateProofAsync, field: "job_id" })?;
        tracing::info!(category = "transport", function_type = "generate_proof_async", %job_id, "Proof job submitted.");
        Ok(JobHandle::new(job_id))
    }

    #[tracing::instrument(skip(self))]
    async fn check_job_status(&self, job_id: &str) -> Result<JobStatus, ClientError> {
        if job_id.is_empty() {
            return Err(ClientError::InvalidRequest("job id must not be empty".to_string()));
        }
        let response = self.backend_client.get_job_status(job_id).await?;
        Ok(response.into_job_status()?)
    }

    #[tracing::instrument(skip(self))]
    async fn verify_proof(&self, deal_id: &str) -> Result<ProofResult, ClientError> {
        if deal_id.is_empty() {
            return Err(ClientError::InvalidRequest("deal id must not be empty".to_string()));
        }
        let response = self.backend_client.verify(&VerifyBody { deal_id }).await?;
        Ok(response.into_proof_result(Operation::VerifyProof)?)
    }
}

impl PofHttpService {
    pub fn new(backend_client: PofBackendClient) -> Self {
        Self { backend_client }
    }

    pub fn new_with_args(args: &PofHttpValidatedArgs) -> Result<Self, PofHttpError> {
        let backend_client = PofBackendClient::new_with_args(args)?;
        tracing::debug!(
            backend_url = %args.backend_url,
            timeout = ?args.request_timeout,
            "Backend client instantiated"
        );
        Ok(Self::new(backend_client))
    }
}
