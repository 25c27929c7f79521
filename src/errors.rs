// Error taxonomy for the callbox service
//
// Denials from the access-control service are NOT errors; they are a
// normal `AuthResult`. Everything here is a failure of the plumbing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CallboxError>;

#[derive(Debug, Error)]
pub enum CallboxError {
    /// The access-control service answered with a non-success status
    #[error("access-control service returned {status} from {endpoint}: {body}")]
    Backend {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response (DNS, connect, TLS, ...)
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the shape we expect
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The trigger result has no forwarding target for the dialed number
    #[error("no forwarding target for called number {called}")]
    MissingForwardingTarget { called: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CallboxError {
    /// Short machine-friendly label used in logs and error reports
    pub fn kind(&self) -> &'static str {
        match self {
            CallboxError::Backend { .. } => "backend_status",
            CallboxError::Transport { .. } => "transport",
            CallboxError::Decode { .. } => "decode",
            CallboxError::MissingForwardingTarget { .. } => "missing_forwarding_target",
            CallboxError::Config(_) => "config",
        }
    }
}
