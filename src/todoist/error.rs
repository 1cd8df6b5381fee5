//! Todoist API-specific error types.

/// Errors that can occur during Todoist API operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoistError {
    /// No API token configured
    #[error("Todoist API token is not configured")]
    NotConfigured,

    /// Token rejected by the service
    #[error("Invalid Todoist API token")]
    Unauthorized,

    /// Too many requests
    #[error("Todoist rate limit reached, retry in {retry_after} seconds")]
    RateLimited { retry_after: String },

    /// Task or project does not exist remotely
    #[error("Todoist resource not found")]
    NotFound,

    /// Service-side failure
    #[error("Todoist server error ({status}), try again later")]
    Server { status: u16 },

    /// Any other rejected request
    #[error("Todoist API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to deserialize API response
    #[error("Failed to deserialize Todoist response: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TodoistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoistError::NotFound)
    }
}
