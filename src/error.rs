//! Application-wide error types.
//!
//! Each module owns its error enum; `AppError` aggregates them for the
//! application edges.

pub use crate::backend::ApiError;
pub use crate::config::ConfigError;
pub use crate::gateway::GatewayError;
pub use crate::store::StoreError;
pub use crate::sync::SyncError;
pub use crate::todo::ValidationError;
pub use crate::todoist::TodoistError;

/// Main application error type.
///
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local todo file errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Backend request errors
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Todoist API errors
    #[error("Todoist error: {0}")]
    Todoist(#[from] TodoistError),

    /// Mutation errors, already phrased for the user
    #[error("{}", .0.user_message())]
    Gateway(#[from] GatewayError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::Gateway(error.into())
    }
}

impl From<SyncError> for AppError {
    fn from(error: SyncError) -> Self {
        AppError::Api(error.into())
    }
}

/// Convenience type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
