use std::fmt;

/// Backend operation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    CreateCommitment,
    GenerateProofSync,
    GenerateProofAsync,
    CheckJobStatus,
    VerifyProof,
}

/// Network failure, timeout, non-success HTTP status, or an error reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub operation: Operation,
    pub status_code: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(operation: Operation, status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self { operation, status_code, message: message.into() }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} failed with HTTP {}: {}", self.operation, code, self.message),
            None => write!(f, "{} failed: {}", self.operation, self.message),
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed {operation} response: {message}")]
    MalformedResponse { operation: Operation, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ClientError::Transport(e) => Some(e.operation),
            ClientError::MalformedResponse { operation, .. } => Some(*operation),
            ClientError::InvalidRequest(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Transport(e) => e.status_code,
            _ => None,
        }
    }
}
