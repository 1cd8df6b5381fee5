//! Todo backends.
//!
//! The client only talks to a `Backend`: either the remote HTTP server
//! (`HttpBackend`) or the standalone JSON-file backend (`LocalBackend`)
//! that serves the same contract in-process.

mod error;
mod http;
mod local;

pub use error::ApiError;
pub use http::HttpBackend;
pub use local::{LocalBackend, TodoistSettings, UPLOADS_DIR};

use crate::sync::{SyncReport, SyncStatus};
use crate::todo::{Todo, TodoFields, TodoId};
use async_trait::async_trait;

/// Operations every todo backend offers.
///
#[async_trait]
pub trait Backend: Send + Sync {
    /// Return the full todo set.
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError>;

    async fn create_todo(&self, fields: &TodoFields) -> Result<Todo, ApiError>;

    async fn update_todo(&self, id: TodoId, fields: &TodoFields) -> Result<Todo, ApiError>;

    async fn delete_todo(&self, id: TodoId) -> Result<Todo, ApiError>;

    async fn toggle_todo(&self, id: TodoId) -> Result<Todo, ApiError>;

    /// Store `bytes` as the attachment of `id`, replacing any previous one.
    async fn upload_attachment(
        &self,
        id: TodoId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Todo, ApiError>;

    async fn remove_attachment(&self, id: TodoId) -> Result<Todo, ApiError>;

    /// Run one reconciliation with the remote task service.
    async fn sync(&self) -> Result<SyncReport, ApiError>;

    async fn sync_status(&self) -> Result<SyncStatus, ApiError>;
}
