use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pof_client_interface::{JobStatus, Operation, ProofRequest};
use rstest::rstest;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{Notify, Semaphore};

use crate::jobs::{wait_for_outcome, ControllerPhase, JobError, JobEvent};
use crate::tests::common::constants::{TEST_DEAL_ID, TEST_POLL_INTERVAL};
use crate::tests::common::{completed, controller_with, proof_request, transport_error, FakeProofClient};

async fn wait_for_phase(controller: &crate::jobs::JobLifecycleController, phase: ControllerPhase) {
    while controller.phase() != phase {
        tokio::task::yield_now().await;
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn start_job_arms_polling(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    let controller = controller_with(client.clone());

    let handle = controller.start_job(&proof_request).await.unwrap();

    assert_eq!(handle.job_id, "job-1");
    assert_eq!(controller.phase(), ControllerPhase::Polling);
    assert_eq!(controller.get_active_job(), Some(handle));
    // the first check waits for a full interval
    assert_eq!(client.status_calls(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn start_job_while_polling_fails_already_active(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    let controller = controller_with(client.clone());

    let handle = controller.start_job(&proof_request).await.unwrap();
    let second = controller.start_job(&proof_request).await;

    assert_eq!(second, Err(JobError::AlreadyActive { job_id: Some(handle.job_id.clone()) }));
    assert_eq!(client.submissions(), 1);
    assert_eq!(controller.get_active_job(), Some(handle));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn start_job_while_submitting_fails_already_active(proof_request: ProofRequest) {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(FakeProofClient::new().with_submit_gate(gate.clone()));
    let controller = Arc::new(controller_with(client.clone()));

    let first = tokio::spawn({
        let controller = controller.clone();
        let request = proof_request.clone();
        async move { controller.start_job(&request).await }
    });
    wait_for_phase(&controller, ControllerPhase::Submitting).await;

    let second = controller.start_job(&proof_request).await;
    assert_eq!(second, Err(JobError::AlreadyActive { job_id: None }));

    gate.notify_one();
    let handle = first.await.unwrap().unwrap();
    assert_eq!(controller.phase(), ControllerPhase::Polling);
    assert_eq!(controller.get_active_job(), Some(handle));
    assert_eq!(client.submissions(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn failed_submission_returns_to_idle(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    client.fail_next_submission(transport_error(Operation::GenerateProofAsync, Some(500)));
    let controller = controller_with(client.clone());

    let result = controller.start_job(&proof_request).await;

    assert_matches!(result, Err(JobError::Client(ref e)) if e.status_code() == Some(500));
    assert_eq!(controller.phase(), ControllerPhase::Idle);
    assert_eq!(controller.get_active_job(), None);

    // the controller accepts the next job
    assert!(controller.start_job(&proof_request).await.is_ok());
}

#[rstest]
#[case::completed(completed(TEST_DEAL_ID))]
#[case::failed(JobStatus::Failed("Not enough commitments".to_string()))]
#[tokio::test(start_paused = true)]
async fn terminal_status_ends_session(proof_request: ProofRequest, #[case] terminal: JobStatus) {
    let client = Arc::new(FakeProofClient::new());
    client.script("job-1", vec![Ok(JobStatus::Pending), Ok(JobStatus::InProgress), Ok(terminal.clone())]);
    let controller = controller_with(client.clone());
    let mut events = controller.subscribe();

    let handle = controller.start_job(&proof_request).await.unwrap();
    let outcome = wait_for_outcome(&mut events, &handle.job_id).await;

    assert_eq!(outcome, Ok(terminal));
    assert_eq!(controller.phase(), ControllerPhase::Idle);
    assert_eq!(controller.get_active_job(), None);
    assert_eq!(client.status_calls(), 3);

    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
    assert_eq!(client.status_calls(), 3);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn non_terminal_statuses_are_published(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    client.script("job-1", vec![Ok(JobStatus::Pending)]);
    let controller = controller_with(client.clone());
    let mut events = controller.subscribe();

    controller.start_job(&proof_request).await.unwrap();
    let event = events.recv().await.unwrap();

    assert_eq!(event, JobEvent::StatusChecked { job_id: "job-1".to_string(), status: JobStatus::Pending });
    assert_eq!(controller.last_status(), Some(JobStatus::Pending));
    assert_eq!(controller.phase(), ControllerPhase::Polling);
    controller.stop_polling();
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn transport_error_aborts_session(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    let error = transport_error(Operation::CheckJobStatus, None);
    client.script("job-1", vec![Ok(JobStatus::Pending), Err(error.clone())]);
    let controller = controller_with(client.clone());
    let mut events = controller.subscribe();

    let handle = controller.start_job(&proof_request).await.unwrap();
    let outcome = wait_for_outcome(&mut events, &handle.job_id).await;

    assert_eq!(outcome, Err(JobError::Client(error)));
    assert_eq!(controller.phase(), ControllerPhase::Idle);

    // no retry
    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
    assert_eq!(client.status_calls(), 2);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_checks_never_overlap(proof_request: ProofRequest) {
    // each check outlasts two ticks
    let client = Arc::new(FakeProofClient::new().with_check_delay(TEST_POLL_INTERVAL * 2 + Duration::from_millis(500)));
    let controller = controller_with(client.clone());

    controller.start_job(&proof_request).await.unwrap();
    tokio::time::sleep(TEST_POLL_INTERVAL * 12).await;
    controller.stop_polling();

    assert_eq!(client.max_in_flight(), 1);
    assert!(client.status_calls() >= 2);
    // ticks that fell due during a check were skipped, not queued
    assert!(client.status_calls() <= 5, "unexpected number of checks: {}", client.status_calls());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stop_polling_twice_is_a_noop(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    let controller = controller_with(client.clone());
    let mut events = controller.subscribe();

    controller.start_job(&proof_request).await.unwrap();
    controller.stop_polling();
    controller.stop_polling();

    assert_eq!(controller.phase(), ControllerPhase::Idle);
    assert_eq!(controller.get_active_job(), None);
    assert_eq!(events.try_recv(), Ok(JobEvent::Stopped { job_id: "job-1".to_string() }));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
    assert_eq!(client.status_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_polling_while_idle_is_safe() {
    let controller = controller_with(Arc::new(FakeProofClient::new()));

    controller.stop_polling();

    assert_eq!(controller.phase(), ControllerPhase::Idle);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stop_during_submission_leaves_job_untracked(proof_request: ProofRequest) {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(FakeProofClient::new().with_submit_gate(gate.clone()));
    let controller = Arc::new(controller_with(client.clone()));

    let submission = tokio::spawn({
        let controller = controller.clone();
        async move { controller.start_job(&proof_request).await }
    });
    wait_for_phase(&controller, ControllerPhase::Submitting).await;

    controller.stop_polling();
    gate.notify_one();

    let handle = submission.await.unwrap().unwrap();
    assert_eq!(handle.job_id, "job-1");
    assert_eq!(controller.phase(), ControllerPhase::Idle);
    assert_eq!(controller.get_active_job(), None);

    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
    assert_eq!(client.status_calls(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn waiting_on_job_stopped_during_submission_ends_with_no_active_job(proof_request: ProofRequest) {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(FakeProofClient::new().with_submit_gate(gate.clone()));
    let controller = Arc::new(controller_with(client.clone()));
    let mut events = controller.subscribe();

    let submission = tokio::spawn({
        let controller = controller.clone();
        async move { controller.start_job(&proof_request).await }
    });
    wait_for_phase(&controller, ControllerPhase::Submitting).await;

    controller.stop_polling();
    gate.notify_one();
    let handle = submission.await.unwrap().unwrap();

    let outcome = tokio::time::timeout(TEST_POLL_INTERVAL * 100, wait_for_outcome(&mut events, &handle.job_id))
        .await
        .expect("waiting on a stopped submission must not hang");
    assert_eq!(outcome, Err(JobError::NoActiveJob));
    assert_eq!(client.status_calls(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn dropped_submission_returns_to_idle(proof_request: ProofRequest) {
    // the gate is never opened
    let client = Arc::new(FakeProofClient::new().with_submit_gate(Arc::new(Notify::new())));
    let controller = controller_with(client.clone());

    let result = tokio::time::timeout(Duration::from_secs(1), controller.start_job(&proof_request)).await;

    assert!(result.is_err());
    assert_eq!(controller.phase(), ControllerPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn check_now_without_job_fails() {
    let controller = controller_with(Arc::new(FakeProofClient::new()));

    assert_eq!(controller.check_now().await, Err(JobError::NoActiveJob));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn check_now_keeps_polling_on_running_job(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    client.script("job-1", vec![Ok(JobStatus::InProgress)]);
    let controller = controller_with(client.clone());
    let mut events = controller.subscribe();

    controller.start_job(&proof_request).await.unwrap();
    let status = controller.check_now().await;

    assert_eq!(status, Ok(JobStatus::InProgress));
    assert_eq!(controller.phase(), ControllerPhase::Polling);
    assert_matches!(events.try_recv(), Ok(JobEvent::StatusChecked { status: JobStatus::InProgress, .. }));
    controller.stop_polling();
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn check_now_terminal_status_ends_session(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    client.script("job-1", vec![Ok(completed(TEST_DEAL_ID))]);
    let controller = controller_with(client.clone());

    controller.start_job(&proof_request).await.unwrap();
    let status = controller.check_now().await;

    assert_eq!(status, Ok(completed(TEST_DEAL_ID)));
    assert_eq!(controller.phase(), ControllerPhase::Idle);

    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
    assert_eq!(client.status_calls(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn check_now_error_ends_session(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    let error = transport_error(Operation::CheckJobStatus, Some(502));
    client.script("job-1", vec![Err(error.clone())]);
    let controller = controller_with(client.clone());

    controller.start_job(&proof_request).await.unwrap();

    assert_eq!(controller.check_now().await, Err(JobError::Client(error)));
    assert_eq!(controller.phase(), ControllerPhase::Idle);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stale_result_does_not_touch_new_session(proof_request: ProofRequest) {
    let gate = Arc::new(Semaphore::new(0));
    let client = Arc::new(FakeProofClient::new().with_check_gate(gate.clone()));
    client.script("job-1", vec![Ok(completed("DEAL-OLD"))]);
    let controller = Arc::new(controller_with(client.clone()));

    controller.start_job(&proof_request).await.unwrap();
    let stale_check = tokio::spawn({
        let controller = controller.clone();
        async move { controller.check_now().await }
    });
    while client.status_calls() == 0 {
        tokio::task::yield_now().await;
    }

    controller.stop_polling();
    let second = controller.start_job(&proof_request).await.unwrap();
    assert_eq!(second.job_id, "job-2");

    // releases the check of job-1 only
    gate.add_permits(1);
    let stale = stale_check.await.unwrap();

    assert_eq!(stale, Ok(completed("DEAL-OLD")));
    assert_eq!(controller.phase(), ControllerPhase::Polling);
    assert_eq!(controller.get_active_job(), Some(second));
    controller.stop_polling();
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn dropping_controller_stops_polling(proof_request: ProofRequest) {
    let client = Arc::new(FakeProofClient::new());
    let controller = controller_with(client.clone());
    let mut events = controller.subscribe();

    controller.start_job(&proof_request).await.unwrap();
    drop(controller);

    assert_eq!(events.recv().await, Ok(JobEvent::Stopped { job_id: "job-1".to_string() }));
    assert_eq!(events.recv().await, Err(RecvError::Closed));

    tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
    assert_eq!(client.status_calls(), 0);
}
