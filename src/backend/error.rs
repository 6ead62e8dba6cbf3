use thiserror::Error;

/// Failures talking to the processing backend.
///
/// Every variant ends up as a user-facing string; none of them is retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Connection refused, DNS failure, timeout, broken body stream
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server returned {status}: {body}")]
    Http { status: u16, body: String },

    /// The body was not the JSON shape we expected
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport("request timed out".to_string())
        } else if e.is_connect() {
            Self::Transport(format!("could not connect to backend ({})", e))
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl SyncError {
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
