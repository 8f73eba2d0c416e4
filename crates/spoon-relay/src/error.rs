use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no API key configured for {0}")]
    MissingCredential(String),

    #[error("credential rejected by the remote service (HTTP 401)")]
    InvalidCredential,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidCredential | RelayError::MissingCredential(_)
        )
    }
}
