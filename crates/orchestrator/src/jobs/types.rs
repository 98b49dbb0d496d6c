use std::fmt;

use pof_client_interface::{ClientError, JobStatus};

/// Identifies one submission and the poll session it may turn into.
///
/// Tokens are issued in increasing order. Check results are applied only while the token they
/// were issued for is still the current session's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ControllerPhase {
    Idle,
    Submitting,
    Polling,
}

/// Published by the controller on every observation it applies.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A non-terminal status was observed; the session keeps polling.
    StatusChecked { job_id: String, status: JobStatus },
    /// A terminal status was observed and the session ended.
    Finished { job_id: String, status: JobStatus },
    /// A status check failed and the session ended.
    Aborted { job_id: String, error: ClientError },
    /// The session was stopped by the caller.
    Stopped { job_id: String },
}

impl JobEvent {
    pub fn job_id(&self) -> &str {
        match self {
            JobEvent::StatusChecked { job_id, .. }
            | JobEvent::Finished { job_id, .. }
            | JobEvent::Aborted { job_id, .. }
            | JobEvent::Stopped { job_id } => job_id,
        }
    }
}
