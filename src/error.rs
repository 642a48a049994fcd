//! Error type shared by the fetcher and the persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid request url {url}: {reason}")]
    Url { url: String, reason: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("page size must be positive")]
    InvalidPageSize,

    #[error("invalid header value for {header}")]
    InvalidHeader { header: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// True for failures raised while talking to the API.
    pub fn is_request_error(&self) -> bool {
        matches!(self, FetchError::Status { .. } | FetchError::Transport(_))
    }

    /// HTTP status of the failed request, if one was received.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
