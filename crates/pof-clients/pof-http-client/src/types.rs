use pof_client_interface::{DealInfo, JobStatus, Operation, ProofResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PofHttpError;

#[derive(Debug, Clone, Serialize)]
pub struct ProofBody<'a> {
    pub required_amount: u64,
    pub deal_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyBody<'a> {
    pub deal_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddJobResponse {
    pub job_id: Option<String>,
}

/// Proof as returned by `/bb/proof`, `/sb/verify` and completed jobs.
///
/// The sync endpoint reports `success` where the others report `verified`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProofResponse {
    pub verified: Option<bool>,
    pub success: Option<bool>,
    pub verified_amount: Option<u64>,
    pub deal_info: Option<DealInfo>,
}

impl ProofResponse {
    pub fn into_proof_result(self, operation: Operation) -> Result<ProofResult, PofHttpError> {
        let verified =
            self.verified.or(self.success).ok_or(PofHttpError::MissingField { operation, field: "verified" })?;
        let deal_info = self.deal_info.ok_or(PofHttpError::MissingField { operation, field: "deal_info" })?;
        Ok(ProofResult { verified, verified_amount: self.verified_amount, deal_info })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BackendJobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub status: BackendJobStatus,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
    pub proof: Option<ProofResponse>,
    pub error: Option<String>,
}

impl JobStatusResponse {
    pub fn into_job_status(self) -> Result<JobStatus, PofHttpError> {
        let operation = Operation::CheckJobStatus;
        match self.status {
            BackendJobStatus::Pending => Ok(JobStatus::Pending),
            BackendJobStatus::InProgress => Ok(JobStatus::InProgress),
            BackendJobStatus::Completed => {
                let proof = self.proof.ok_or(PofHttpError::MissingField { operation, field: "proof" })?;
                Ok(JobStatus::Completed(proof.into_proof_result(operation)?))
            }
            BackendJobStatus::Failed => Ok(JobStatus::Failed(self.error.unwrap_or_default())),
        }
    }
}

/// Decodes a success body, surfacing the backend's in-band `{"error": ...}` replies.
pub fn decode_body<R: DeserializeOwned>(operation: Operation, bytes: &[u8]) -> Result<R, PofHttpError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| PofHttpError::Decode { operation, source })?;
    if let Some(message) = in_band_error(&value) {
        return Err(PofHttpError::Backend { operation, message });
    }
    serde_json::from_value(value).map_err(|source| PofHttpError::Decode { operation, source })
}

fn in_band_error(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get("error").map(|error| match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}
