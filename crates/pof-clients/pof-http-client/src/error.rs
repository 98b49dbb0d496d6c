use pof_client_interface::{ClientError, Operation, TransportError};
use reqwest::StatusCode;
use utils::http_client::HttpClientError;

#[derive(Debug, thiserror::Error)]
pub enum PofHttpError {
    #[error("Failed to build the backend HTTP client: {0}")]
    Build(#[source] HttpClientError),

    #[error("Failed to send {operation} request: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: HttpClientError,
    },

    #[error("Backend returned {status} for {operation}: {body}")]
    Status { operation: Operation, status: StatusCode, body: String },

    #[error("Backend reported an error for {operation}: {message}")]
    Backend { operation: Operation, message: String },

    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} response is missing `{field}`")]
    MissingField { operation: Operation, field: &'static str },
}

impl From<PofHttpError> for ClientError {
    fn from(value: PofHttpError) -> Self {
        match value {
            PofHttpError::Build(e) => Self::InvalidRequest(format!("invalid backend client configuration: {e}")),
            PofHttpError::Request { operation, source } => {
                let message =
                    if source.is_timeout() { format!("request timed out: {source}") } else { source.to_string() };
                Self::Transport(TransportError::new(operation, source.status().map(|s| s.as_u16()), message))
            }
            PofHttpError::Status { operation, status, body } => {
                let message = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                };
                Self::Transport(TransportError::new(operation, Some(status.as_u16()), message))
            }
            PofHttpError::Backend { operation, message } => {
                Self::Transport(TransportError::new(operation, None, message))
            }
            PofHttpError::Decode { operation, source } => {
                Self::MalformedResponse { operation, message: source.to_string() }
            }
            PofHttpError::MissingField { operation, field } => {
                Self::MalformedResponse { operation, message: format!("missing `{field}`") }
            }
        }
    }
}
