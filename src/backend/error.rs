//! Backend error types.

use crate::store::StoreError;

/// Errors that can occur while talking to a todo backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never got a response
    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with an error payload
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Todo does not exist (anymore)
    #[error("Todo not found")]
    NotFound,

    /// Response body did not match the expected shape
    #[error("Unexpected response from server: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Build a rejection from an HTTP status and the `{"error": ...}` body.
    ///
    pub fn from_payload(status: u16, body: &[u8]) -> Self {
        if status == 404 {
            return ApiError::NotFound;
        }
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|payload| {
                payload
                    .get("error")
                    .and_then(|e| e.as_str())
                    .map(str::to_owned)
            })
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        ApiError::Rejected { status, message }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound,
            err => ApiError::Rejected {
                status: 500,
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}
