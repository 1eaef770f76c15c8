use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned {status}: {preview}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        preview: String,
    },

    #[error("{operation} returned an unreadable body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Client(_) => None,
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
        }
    }

    /// Network-level failure, as opposed to a reply the backend chose to send.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Client(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
