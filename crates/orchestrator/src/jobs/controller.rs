use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt as _;
use opentelemetry::KeyValue;
use pof_client_interface::{ClientError, JobHandle, JobStatus, ProofOfFundsClient, ProofRequest};
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::constants::JOB_EVENT_CHANNEL_CAPACITY;
use crate::jobs::types::{ControllerPhase, JobEvent, SessionToken};
use crate::jobs::JobError;
use crate::metrics::POF_METRICS;

/// Tracks at most one asynchronous proof job and polls its status until it ends.
///
/// Lifecycle: `Idle -> Submitting -> Polling -> Idle`. A session leaves `Polling` when a
/// terminal status is observed, when a status check fails, or when [`Self::stop_polling`] is
/// called. Dropping the controller stops any armed session.
pub struct JobLifecycleController {
    shared: Arc<Shared>,
    poll_interval: Duration,
}

struct Shared {
    client: Arc<dyn ProofOfFundsClient>,
    state: Mutex<ControllerState>,
    events: broadcast::Sender<JobEvent>,
}

struct ControllerState {
    phase: Phase,
    last_token: u64,
}

enum Phase {
    Idle,
    Submitting { token: SessionToken },
    Polling(PollSession),
}

struct PollSession {
    token: SessionToken,
    handle: JobHandle,
    cancel: CancellationToken,
    last_status: Option<JobStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckOutcome {
    KeepPolling,
    SessionEnded,
    Stale,
}

impl JobLifecycleController {
    pub fn new(client: Arc<dyn ProofOfFundsClient>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(JOB_EVENT_CHANNEL_CAPACITY);
        let state = ControllerState { phase: Phase::Idle, last_token: 0 };
        Self { shared: Arc::new(Shared { client, state: Mutex::new(state), events }), poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Receives every [`JobEvent`] published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.shared.events.subscribe()
    }

    pub fn phase(&self) -> ControllerPhase {
        match self.shared.lock_state().phase {
            Phase::Idle => ControllerPhase::Idle,
            Phase::Submitting { .. } => ControllerPhase::Submitting,
            Phase::Polling(_) => ControllerPhase::Polling,
        }
    }

    pub fn get_active_job(&self) -> Option<JobHandle> {
        match &self.shared.lock_state().phase {
            Phase::Polling(session) => Some(session.handle.clone()),
            _ => None,
        }
    }

    /// Last non-terminal status observed for the active job.
    pub fn last_status(&self) -> Option<JobStatus> {
        match &self.shared.lock_state().phase {
            Phase::Polling(session) => session.last_status.clone(),
            _ => None,
        }
    }

    /// Submits a proof job and arms the poll timer for it.
    ///
    /// Returns once the submission call has completed. Fails with [`JobError::AlreadyActive`]
    /// while another submission is in flight or another job is being polled.
    #[tracing::instrument(skip(self, request), fields(category = "proof_job", deal_id = %request.deal_id), err)]
    pub async fn start_job(&self, request: &ProofRequest) -> Result<JobHandle, JobError> {
        let token = {
            let mut state = self.shared.lock_state();
            match &state.phase {
                Phase::Idle => {}
                Phase::Submitting { .. } => return Err(JobError::AlreadyActive { job_id: None }),
                Phase::Polling(session) => {
                    return Err(JobError::AlreadyActive { job_id: Some(session.handle.job_id.clone()) });
                }
            }
            let token = state.issue_token();
            state.phase = Phase::Submitting { token };
            token
        };
        tracing::info!(
            log_type = "starting",
            category = "proof_job",
            function_type = "start_job",
            %token,
            "Submitting proof job."
        );

        // Resets the phase if this future is dropped mid-submission.
        let guard = SubmissionGuard { shared: &*self.shared, token, armed: true };
        let submitted = self.shared.client.generate_proof_async(request).await;
        guard.disarm();

        let mut state = self.shared.lock_state();
        let still_submitting = matches!(state.phase, Phase::Submitting { token: current } if current == token);

        let handle = match submitted {
            Ok(handle) => handle,
            Err(error) => {
                if still_submitting {
                    state.phase = Phase::Idle;
                }
                tracing::error!(
                    log_type = "failed",
                    category = "proof_job",
                    function_type = "start_job",
                    %token,
                    error = %error,
                    "Proof job submission failed."
                );
                return Err(error.into());
            }
        };

        if !still_submitting {
            tracing::warn!(job_id = %handle.job_id, %token, "Stopped during submission, job is not tracked");
            // waiters subscribed before the submission learn the job will never be polled
            self.shared.publish(JobEvent::Stopped { job_id: handle.job_id.clone() });
            return Ok(handle);
        }

        let cancel = CancellationToken::new();
        state.phase = Phase::Polling(PollSession {
            token,
            handle: handle.clone(),
            cancel: cancel.clone(),
            last_status: None,
        });
        tokio::spawn(run_poll_session(self.shared.clone(), token, handle.job_id.clone(), cancel, self.poll_interval));

        tracing::info!(
            log_type = "completed",
            category = "proof_job",
            function_type = "start_job",
            job_id = %handle.job_id,
            %token,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Proof job submitted, polling armed."
        );
        Ok(handle)
    }

    /// Runs one status check for the active job outside of the timer schedule.
    ///
    /// The result goes through the same path as timer checks: a terminal status or an error ends
    /// the session. The periodic schedule is left untouched otherwise.
    #[tracing::instrument(skip(self), fields(category = "proof_job"), err)]
    pub async fn check_now(&self) -> Result<JobStatus, JobError> {
        let (token, job_id) = match &self.shared.lock_state().phase {
            Phase::Polling(session) => (session.token, session.handle.job_id.clone()),
            _ => return Err(JobError::NoActiveJob),
        };

        let result = self.shared.check_status(&job_id).await;
        self.shared.apply_check_result(token, &job_id, result.clone());
        Ok(result?)
    }

    /// Cancels the armed timer and forgets the active job. Calling it while idle does nothing.
    pub fn stop_polling(&self) {
        let mut state = self.shared.lock_state();
        match std::mem::replace(&mut state.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Submitting { token } => {
                tracing::info!(category = "proof_job", %token, "Stopped while a submission was in flight.");
            }
            Phase::Polling(session) => {
                session.cancel.cancel();
                tracing::info!(
                    log_type = "completed",
                    category = "proof_job",
                    function_type = "stop_polling",
                    job_id = %session.handle.job_id,
                    token = %session.token,
                    "Polling stopped."
                );
                self.shared.publish(JobEvent::Stopped { job_id: session.handle.job_id });
            }
        }
    }
}

impl Drop for JobLifecycleController {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

impl ControllerState {
    fn issue_token(&mut self) -> SessionToken {
        self.last_token += 1;
        SessionToken::new(self.last_token)
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        // state transitions never panic halfway, so a poisoned lock still holds a valid phase
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, event: JobEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn check_status(&self, job_id: &str) -> Result<JobStatus, ClientError> {
        let started = std::time::Instant::now();
        let result = self.client.check_job_status(job_id).await;

        let outcome = match &result {
            Ok(status) => status.name(),
            Err(_) => "error",
        };
        POF_METRICS.status_check_latency.record(started.elapsed().as_secs_f64() * 1000.0, &[]);
        POF_METRICS.status_checks.add(1, &[KeyValue::new("outcome", outcome)]);
        result
    }

    /// Applies a check result to the session identified by `token`.
    fn apply_check_result(
        &self,
        token: SessionToken,
        job_id: &str,
        result: Result<JobStatus, ClientError>,
    ) -> CheckOutcome {
        let mut state = self.lock_state();
        let session = match &mut state.phase {
            Phase::Polling(session) if session.token == token => session,
            _ => {
                tracing::debug!(job_id, %token, "Discarding status check result of an ended session");
                return CheckOutcome::Stale;
            }
        };

        match result {
            Ok(status) if !status.is_terminal() => {
                tracing::info!(
                    log_type = "pending",
                    category = "proof_job",
                    function_type = "check_status",
                    job_id,
                    status = status.name(),
                    "Proof job still running."
                );
                session.last_status = Some(status.clone());
                self.publish(JobEvent::StatusChecked { job_id: job_id.to_string(), status });
                CheckOutcome::KeepPolling
            }
            Ok(status) => {
                session.cancel.cancel();
                state.phase = Phase::Idle;
                POF_METRICS.jobs_finished.add(1, &[KeyValue::new("status", status.name())]);
                tracing::info!(
                    log_type = "completed",
                    category = "proof_job",
                    function_type = "check_status",
                    job_id,
                    status = status.name(),
                    "Proof job reached a terminal status."
                );
                self.publish(JobEvent::Finished { job_id: job_id.to_string(), status });
                CheckOutcome::SessionEnded
            }
            Err(error) => {
                session.cancel.cancel();
                state.phase = Phase::Idle;
                tracing::error!(
                    log_type = "failed",
                    category = "proof_job",
                    function_type = "check_status",
                    job_id,
                    error = %error,
                    "Status check failed, polling stopped."
                );
                self.publish(JobEvent::Aborted { job_id: job_id.to_string(), error });
                CheckOutcome::SessionEnded
            }
        }
    }
}

struct SubmissionGuard<'a> {
    shared: &'a Shared,
    token: SessionToken,
    armed: bool,
}

impl SubmissionGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.shared.lock_state();
        if matches!(state.phase, Phase::Submitting { token } if token == self.token) {
            tracing::warn!(token = %self.token, "Submission abandoned before completion");
            state.phase = Phase::Idle;
        }
    }
}

/// Timer task of one poll session. Checks run inline and ticks that fell due while a check was
/// outstanding are dropped afterwards, so the next check waits for the next interval boundary.
async fn run_poll_session(
    shared: Arc<Shared>,
    token: SessionToken,
    job_id: String,
    cancel: CancellationToken,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = shared.check_status(&job_id) => result,
        };

        if shared.apply_check_result(token, &job_id, result) != CheckOutcome::KeepPolling {
            break;
        }

        // drop ticks that fell due while the check was outstanding
        while ticker.tick().now_or_never().is_some() {
            tracing::debug!(job_id, %token, "Skipped a tick that fell due during a status check");
        }
    }

    tracing::debug!(job_id, %token, "Poll session task exited");
}
