pub mod controller;
pub mod types;

use pof_client_interface::{ClientError, JobStatus};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

pub use crate::jobs::controller::JobLifecycleController;
pub use crate::jobs::types::{ControllerPhase, JobEvent, SessionToken};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobError {
    #[error("A proof job is already active ({})", .job_id.as_deref().unwrap_or("submission in flight"))]
    AlreadyActive { job_id: Option<String> },

    #[error("No active proof job")]
    NoActiveJob,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Waits until the session of `job_id` ends and returns its terminal status.
///
/// Subscribe before starting the job, otherwise a fast terminal event can be missed.
/// A stopped session yields [`JobError::NoActiveJob`].
pub async fn wait_for_outcome(events: &mut broadcast::Receiver<JobEvent>, job_id: &str) -> Result<JobStatus, JobError> {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, job_id, "Job event receiver lagged behind");
                continue;
            }
            Err(RecvError::Closed) => return Err(JobError::NoActiveJob),
        };
        if event.job_id() != job_id {
            continue;
        }

        match event {
            JobEvent::StatusChecked { status, .. } => {
                tracing::info!(job_id, status = status.name(), "Proof job still running");
            }
            JobEvent::Finished { status, .. } => return Ok(status),
            JobEvent::Aborted { error, .. } => return Err(error.into()),
            JobEvent::Stopped { .. } => return Err(JobError::NoActiveJob),
        }
    }
}
