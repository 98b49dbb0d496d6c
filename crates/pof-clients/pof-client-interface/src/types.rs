use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A pledge of funds from one bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRequest {
    pub bank_index: u64,
    pub amount: u64,
    /// Deal the commitment is pledged to. The backend picks its default deal when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
}

impl CommitmentRequest {
    pub fn new(bank_index: u64, amount: u64) -> Self {
        Self { bank_index, amount, deal_id: None, buyer: None }
    }

    pub fn with_deal_id(mut self, deal_id: impl Into<String>) -> Self {
        self.deal_id = Some(deal_id.into());
        self
    }

    pub fn with_buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = Some(buyer.into());
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.amount == 0 {
            return Err(ClientError::InvalidRequest("commitment amount must be positive".to_string()));
        }
        if matches!(self.deal_id.as_deref(), Some("")) {
            return Err(ClientError::InvalidRequest("commitment deal id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// The proof to generate for a named deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    pub required_amount: u64,
    pub deal_id: String,
}

impl ProofRequest {
    pub fn new(required_amount: u64, deal_id: impl Into<String>) -> Self {
        Self { required_amount, deal_id: deal_id.into() }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.required_amount == 0 {
            return Err(ClientError::InvalidRequest("required amount must be positive".to_string()));
        }
        if self.deal_id.is_empty() {
            return Err(ClientError::InvalidRequest("deal id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Backend-defined acknowledgment of a commitment, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitmentAck(pub serde_json::Value);

/// Identifies one asynchronous proof-generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    /// When the submission call returned.
    pub created_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into(), created_at: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealInfo {
    pub amount: u64,
    pub buyer: String,
    pub deal_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResult {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_amount: Option<u64>,
    pub deal_info: DealInfo,
}

/// Status of a backend job. The backend is the only source of transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed(ProofResult),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "InProgress",
            JobStatus::Completed(_) => "Completed",
            JobStatus::Failed(_) => "Failed",
        }
    }
}
