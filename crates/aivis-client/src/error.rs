use thiserror::Error;

/// Errors returned by the backend and validation clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Polling gave up before the resource reached a terminal status.
    #[error("{resource} {id} still not finished after {attempts} polls")]
    PollTimeout {
        resource: &'static str,
        id: String,
        attempts: u32,
    },
}

impl ClientError {
    /// `true` for failures worth waiting out during polling: timeouts,
    /// connection failures, and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ClientError::UnexpectedStatus { status, .. } => *status >= 500,
            ClientError::NotFound { .. }
            | ClientError::Deserialize { .. }
            | ClientError::InvalidBaseUrl { .. }
            | ClientError::PollTimeout { .. } => false,
        }
    }
}
