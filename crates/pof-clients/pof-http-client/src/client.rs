use pof_client_interface::{CommitmentRequest, Operation};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use utils::http_client::{HttpClient, HttpClientError, RequestBuilder};

use crate::config::PofHttpValidatedArgs;
use crate::error::PofHttpError;
use crate::types::{decode_body, AddJobResponse, JobStatusResponse, ProofBody, ProofResponse, VerifyBody};

/// Proof-of-funds backend API async wrapper
#[derive(Debug, Clone)]
pub struct PofBackendClient {
    client: HttpClient,
}

impl PofBackendClient {
    pub fn new_with_args(args: &PofHttpValidatedArgs) -> Result<Self, PofHttpError> {
        let client = HttpClient::builder(args.backend_url.as_str())
            .timeout(args.request_timeout)
            .build()
            .map_err(PofHttpError::Build)?;

        Ok(Self { client })
    }

    pub async fn create_commitment(&self, request: &CommitmentRequest) -> Result<Value, PofHttpError> {
        let operation = Operation::CreateCommitment;
        let request = self.json_request(operation, Method::POST, "lb/commitment", request)?;
        self.send(operation, request).await
    }

    pub async fn generate_proof(&self, body: &ProofBody<'_>) -> Result<ProofResponse, PofHttpError> {
        let operation = Operation::GenerateProofSync;
        let request = self.json_request(operation, Method::POST, "bb/proof", body)?;
        self.send(operation, request).await
    }

    pub async fn add_job(&self, body: &ProofBody<'_>) -> Result<AddJobResponse, PofHttpError> {
        let operation = Operation::GenerateProofAsync;
        let request = self.json_request(operation, Method::POST, "proofs/async", body)?;
        self.send(operation, request).await
    }

    pub async fn get_job_status(&self, job_id: &str) -> Result<JobStatusResponse, PofHttpError> {
        let request = self.client.request().method(Method::GET).path("proofs/async").path_segment(job_id);
        self.send(Operation::CheckJobStatus, request).await
    }

    pub async fn verify(&self, body: &VerifyBody<'_>) -> Result<ProofResponse, PofHttpError> {
        let operation = Operation::VerifyProof;
        let request = self.json_request(operation, Method::POST, "sb/verify", body)?;
        self.send(operation, request).await
    }

    fn json_request<T: serde::Serialize + ?Sized>(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<RequestBuilder<'_>, PofHttpError> {
        self.client
            .request()
            .method(method)
            .path(path)
            .json(body)
            .map_err(|source| PofHttpError::Request { operation, source })
    }

    async fn send<R: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder<'_>,
    ) -> Result<R, PofHttpError> {
        let response = request.send().await.map_err(|source| PofHttpError::Request { operation, source })?;
        let status = response.status();
        tracing::debug!(%operation, %status, "Backend responded");

        if !status.is_success() {
            // error bodies are not guaranteed to be JSON, keep them as text
            let body = response.text().await.unwrap_or_default();
            return Err(PofHttpError::Status { operation, status, body });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PofHttpError::Request { operation, source: HttpClientError::from(e) })?;
        decode_body(operation, &bytes)
    }
}
