//! Client-side validation errors.

/// Errors raised before any request leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Todo text is empty after trimming
    #[error("Text is required")]
    EmptyText,

    /// Deadline could not be parsed as a calendar date
    #[error("Invalid deadline '{0}' (expected YYYY-MM-DD)")]
    InvalidDeadline(String),

    /// Operation needs a selected todo
    #[error("No todo selected")]
    NoSelection,

    /// Attachment exceeds the upload limit
    #[error("File is too large ({size} bytes, max 10 MB)")]
    FileTooLarge { size: u64 },

    /// Attachment extension is not accepted
    #[error("File type not allowed: {0}")]
    UnsupportedType(String),

    /// Attachment could not be inspected
    #[error("Cannot read file {path}: {message}")]
    UnreadableFile { path: String, message: String },
}
