
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use constants::*;
use pof_client_interface::{
    ClientError, CommitmentAck, CommitmentRequest, DealInfo, JobHandle, JobStatus, Operation, ProofOfFundsClient,
    ProofRequest, ProofResult, TransportError,
};
use rstest::*;
use serde_json::json;
use tokio::sync::{Notify, Semaphore};

use crate::jobs::JobLifecycleController;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).with_target(false).try_init();
}

pub fn deal_info(deal_id: &str) -> DealInfo {
    DealInfo { amount: TEST_VERIFIED_AMOUNT, buyer: TEST_BUYER.to_string(), deal_id: deal_id.to_string() }
}

pub fn proof_result(deal_id: &str) -> ProofResult {
    ProofResult { verified: true, verified_amount: Some(TEST_VERIFIED_AMOUNT), deal_info: deal_info(deal_id) }
}

pub fn completed(deal_id: &str) -> JobStatus {
    JobStatus::Completed(proof_result(deal_id))
}

pub fn transport_error(operation: Operation, status_code: Option<u16>) -> ClientError {
    ClientError::Transport(TransportError::new(operation, status_code, "backend unavailable"))
}

#[fixture]
pub fn proof_request() -> ProofRequest {
    ProofRequest::new(TEST_REQUIRED_AMOUNT, TEST_DEAL_ID)
}

/// In-memory backend with scripted job statuses.
///
/// Job ids are handed out as `job-1`, `job-2`, ... Each status check of a job pops the next
/// scripted result, or answers `InProgress` once the script is exhausted. Checks can be held
/// back by a gate and slowed down by a delay, which also works under paused tokio time.
#[derive(Default)]
pub struct FakeProofClient {
    next_job: AtomicU64,
    scripts: Mutex<HashMap<String, VecDeque<Result<JobStatus, ClientError>>>>,
    submit_result: Mutex<Option<ClientError>>,
    submit_gate: Option<Arc<Notify>>,
    check_gate: Option<Arc<Semaphore>>,
    check_delay: Duration,
    status_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProofClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions wait for a notification before returning.
    pub fn with_submit_gate(mut self, gate: Arc<Notify>) -> Self {
        self.submit_gate = Some(gate);
        self
    }

    /// Every status check consumes one permit before answering.
    pub fn with_check_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.check_gate = Some(gate);
        self
    }

    pub fn with_check_delay(mut self, delay: Duration) -> Self {
        self.check_delay = delay;
        self
    }

    /// The next submission fails with `error`.
    pub fn fail_next_submission(&self, error: ClientError) {
        *self.submit_result.lock().unwrap() = Some(error);
    }

    pub fn script(&self, job_id: &str, results: Vec<Result<JobStatus, ClientError>>) {
        self.scripts.lock().unwrap().insert(job_id.to_string(), results.into());
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> u64 {
        self.next_job.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProofOfFundsClient for FakeProofClient {
    async fn create_commitment(&self, request: &CommitmentRequest) -> Result<CommitmentAck, ClientError> {
        request.validate()?;
        Ok(CommitmentAck(json!({ "bank_index": request.bank_index, "amount": request.amount })))
    }

    async fn generate_proof_sync(&self, request: &ProofRequest) -> Result<ProofResult, ClientError> {
        request.validate()?;
        Ok(proof_result(&request.deal_id))
    }

    async fn generate_proof_async(&self, request: &ProofRequest) -> Result<JobHandle, ClientError> {
        request.validate()?;
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        if let Some(error) = self.submit_result.lock().unwrap().take() {
            return Err(error);
        }
        let job_number = self.next_job.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(JobHandle::new(format!("job-{job_number}")))
    }

    async fn check_job_status(&self, job_id: &str) -> Result<JobStatus, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if let Some(gate) = &self.check_gate {
            gate.acquire().await.expect("check gate closed").forget();
        }
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }

        let next = self.scripts.lock().unwrap().get_mut(job_id).and_then(|script| script.pop_front());
        next.unwrap_or(Ok(JobStatus::InProgress))
    }

    async fn verify_proof(&self, deal_id: &str) -> Result<ProofResult, ClientError> {
        Ok(proof_result(deal_id))
    }
}

/// Decrements the in-flight counter even when the check future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn controller_with(client: Arc<FakeProofClient>) -> JobLifecycleController {
    init_test_tracing();
    JobLifecycleController::new(client, TEST_POLL_INTERVAL)
}
