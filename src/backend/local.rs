//! Standalone backend: the server contract served from a local JSON file.

use super::{ApiError, Backend};
use crate::store::{StoreError, TodoStore, FILE_NAME};
use crate::sync::{self, SyncError, SyncReport, SyncStatus};
use crate::todo::{attachment, Todo, TodoFields, TodoId};
use crate::todoist::{Todoist, TodoistError, DEFAULT_API_BASE};
use async_trait::async_trait;
use log::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;

/// Directory below the data directory that holds uploaded files.
pub const UPLOADS_DIR: &str = "uploads";

/// Credentials and endpoint of the remote task service.
///
#[derive(Clone, Debug)]
pub struct TodoistSettings {
    pub api_token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for TodoistSettings {
    fn default() -> Self {
        TodoistSettings {
            api_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl TodoistSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_token.trim().is_empty()
    }
}

pub struct LocalBackend {
    store: Mutex<TodoStore>,
    uploads_dir: PathBuf,
    todoist: TodoistSettings,
    last_sync: Mutex<Option<String>>,
}

impl LocalBackend {
    /// Open the backend rooted at `data_dir`.
    ///
    pub fn open(data_dir: &Path, todoist: TodoistSettings) -> Result<Self, StoreError> {
        let store = TodoStore::open(data_dir.join(FILE_NAME))?;
        Ok(LocalBackend::with_store(
            store,
            data_dir.join(UPLOADS_DIR),
            todoist,
        ))
    }

    pub fn with_store(store: TodoStore, uploads_dir: PathBuf, todoist: TodoistSettings) -> Self {
        LocalBackend {
            store: Mutex::new(store),
            uploads_dir,
            todoist,
            last_sync: Mutex::new(None),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    fn discard_file(&self, stored: &str) {
        let path = self.uploads_dir.join(stored);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

fn rejected(message: impl Into<String>) -> ApiError {
    ApiError::Rejected {
        status: 400,
        message: message.into(),
    }
}

/// Keep only characters that are safe in a file name.
///
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotConfigured => rejected(SyncError::NotConfigured.to_string()),
            SyncError::Remote(TodoistError::Http(e)) if e.is_connect() || e.is_timeout() => {
                ApiError::Rejected {
                    status: 503,
                    message: "Could not connect to Todoist. Check your internet connection."
                        .to_string(),
                }
            }
            SyncError::Remote(e) => ApiError::Rejected {
                status: 502,
                message: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        Ok(self.store.lock().await.list().to_vec())
    }

    async fn create_todo(&self, fields: &TodoFields) -> Result<Todo, ApiError> {
        let fields = fields
            .validated()
            .map_err(|e| rejected(e.to_string()))?;
        Ok(self.store.lock().await.add(fields)?)
    }

    async fn update_todo(&self, id: TodoId, fields: &TodoFields) -> Result<Todo, ApiError> {
        let fields = fields
            .validated()
            .map_err(|e| rejected(e.to_string()))?;
        Ok(self.store.lock().await.update(id, fields)?)
    }

    async fn delete_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        let removed = self.store.lock().await.delete(id)?;
        if let Some(stored) = &removed.attachment {
            self.discard_file(stored);
        }
        Ok(removed)
    }

    async fn toggle_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        Ok(self.store.lock().await.toggle(id)?)
    }

    async fn upload_attachment(
        &self,
        id: TodoId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Todo, ApiError> {
        let mut store = self.store.lock().await;
        let previous = store
            .get(id)
            .ok_or(ApiError::NotFound)?
            .attachment
            .clone();
        let original = sanitize_file_name(file_name);
        if original.is_empty() {
            return Err(rejected("no file selected"));
        }
        attachment::check_extension(&original).map_err(|_| rejected("file type not allowed"))?;
        attachment::check_size(bytes.len() as u64)
            .map_err(|_| rejected("file too large (max 10 MB)"))?;

        if let Some(stored) = previous {
            self.discard_file(&stored);
        }
        let unique = uuid::Uuid::new_v4().to_simple().to_string();
        let stored = format!("{}_{}", &unique[..8], original);
        let path = self.uploads_dir.join(&stored);
        let write = |e: std::io::Error| ApiError::Rejected {
            status: 500,
            message: format!("Failed to store {}: {}", path.display(), e),
        };
        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(write)?;
        tokio::fs::write(&path, &bytes).await.map_err(write)?;
        info!("Stored attachment {} for todo {}", stored, id);
        Ok(store.set_attachment(id, Some(stored))?)
    }

    async fn remove_attachment(&self, id: TodoId) -> Result<Todo, ApiError> {
        let mut store = self.store.lock().await;
        let previous = store
            .get(id)
            .ok_or(ApiError::NotFound)?
            .attachment
            .clone();
        if let Some(stored) = previous {
            self.discard_file(&stored);
        }
        Ok(store.set_attachment(id, None)?)
    }

    async fn sync(&self) -> Result<SyncReport, ApiError> {
        if !self.todoist.is_configured() {
            return Err(SyncError::NotConfigured.into());
        }
        let mut todoist = Todoist::new(
            &self.todoist.api_token,
            &self.todoist.api_base,
            self.todoist.timeout,
        )
        .map_err(SyncError::from)?;
        let mut store = self.store.lock().await;
        let report = sync::reconcile(&mut store, &mut todoist).await?;
        *self.last_sync.lock().await =
            Some(chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string());
        Ok(report)
    }

    async fn sync_status(&self) -> Result<SyncStatus, ApiError> {
        Ok(SyncStatus {
            configured: self.todoist.is_configured(),
            last_sync: self.last_sync.lock().await.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use serde_json::json;
    use tempfile::tempdir;

    fn backend(dir: &Path) -> LocalBackend {
        LocalBackend::open(dir, TodoistSettings::default()).unwrap()
    }

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("min fil (1).pdf"), "min_fil__1_.pdf");
        assert_eq!(sanitize_file_name("C:\\docs\\a.txt"), "a.txt");
    }

    #[tokio::test]
    async fn create_rejects_blank_text() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path());
        let error = backend
            .create_todo(&TodoFields::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Rejected { status: 400, .. }));
        assert!(backend.fetch_todos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_replaces_previous_file() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path());
        let todo = backend.create_todo(&TodoFields::new("Kvittering")).await.unwrap();

        let first = backend
            .upload_attachment(todo.id, "kvittering.pdf", b"v1".to_vec())
            .await
            .unwrap();
        let first_name = first.attachment.clone().unwrap();
        assert!(first_name.ends_with("_kvittering.pdf"));
        assert_eq!(attachment::display_name(&first_name), "kvittering.pdf");
        assert!(backend.uploads_dir().join(&first_name).exists());

        let second = backend
            .upload_attachment(todo.id, "kvittering.pdf", b"v2".to_vec())
            .await
            .unwrap();
        let second_name = second.attachment.unwrap();
        assert!(!backend.uploads_dir().join(&first_name).exists());
        assert_eq!(
            std::fs::read(backend.uploads_dir().join(&second_name)).unwrap(),
            b"v2"
        );

        let cleared = backend.remove_attachment(todo.id).await.unwrap();
        assert_eq!(cleared.attachment, None);
        assert!(!backend.uploads_dir().join(&second_name).exists());
    }

    #[tokio::test]
    async fn upload_rejects_type_and_size() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path());
        let todo = backend.create_todo(&TodoFields::new("x")).await.unwrap();
        let error = backend
            .upload_attachment(todo.id, "virus.exe", vec![0])
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "file type not allowed");
        let error = backend
            .upload_attachment(
                todo.id,
                "stor.pdf",
                vec![0; attachment::MAX_FILE_SIZE as usize + 1],
            )
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "file too large (max 10 MB)");
    }

    #[tokio::test]
    async fn missing_todo_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path());
        assert!(matches!(
            backend.toggle_todo(5).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            backend.remove_attachment(5).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn sync_without_token_is_rejected() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path());
        let error = backend.sync().await.unwrap_err();
        assert!(matches!(error, ApiError::Rejected { status: 400, .. }));
        assert!(!backend.sync_status().await.unwrap().configured);
    }

    #[tokio::test]
    async fn sync_pushes_and_records_time() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/projects");
            then.status(200).json_body(json!([]));
        });
        server.mock(|when, then| {
            when.method("GET").path("/tasks");
            then.status(200).json_body(json!([]));
        });
        let create = server.mock(|when, then| {
            when.method("POST").path("/tasks");
            then.status(200).json_body(json!({"id": "900", "content": "Lokal"}));
        });

        let dir = tempdir().unwrap();
        let backend = LocalBackend::open(
            dir.path(),
            TodoistSettings {
                api_token: "token".into(),
                api_base: server.base_url(),
                timeout: Duration::from_secs(5),
            },
        )
        .unwrap();
        backend.create_todo(&TodoFields::new("Lokal")).await.unwrap();

        let report = backend.sync().await.unwrap();
        create.assert();
        assert_eq!(report.pushed, 1);
        assert!(report.success);
        let todos = backend.fetch_todos().await.unwrap();
        assert_eq!(todos[0].todoist_id.as_deref(), Some("900"));
        assert!(backend.sync_status().await.unwrap().last_sync.is_some());
    }

    #[tokio::test]
    async fn sync_auth_failure_is_bad_gateway() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/projects");
            then.status(401);
        });
        let dir = tempdir().unwrap();
        let backend = LocalBackend::open(
            dir.path(),
            TodoistSettings {
                api_token: "wrong".into(),
                api_base: server.base_url(),
                timeout: Duration::from_secs(5),
            },
        )
        .unwrap();
        let error = backend.sync().await.unwrap_err();
        assert!(matches!(error, ApiError::Rejected { status: 502, .. }));
        assert!(backend.sync_status().await.unwrap().last_sync.is_none());
    }
}
