//! Mutation gateway.
//!
//! Every user-initiated change goes through `Gateway`: inputs are validated
//! before anything leaves the client, exactly one backend request is issued,
//! and on success the full todo set is fetched again so callers always work
//! with the backend's view.

use crate::backend::{ApiError, Backend};
use crate::sync::{SyncGuard, SyncReport, SyncStatus};
use crate::todo::{AttachmentFile, Todo, TodoFields, TodoId, ValidationError};
use log::*;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Errors surfaced to the user by a gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Rejected before any request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend failed or refused the request
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl GatewayError {
    /// Text for the notice line.
    ///
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Api(ApiError::Transport(_)) => {
                "Could not reach the server. Check your connection.".to_string()
            }
            GatewayError::Api(ApiError::NotFound) => "Todo no longer exists".to_string(),
            other => other.to_string(),
        }
    }
}

/// A destructive request waiting for the user's answer.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pending<T>(T);

/// Proof that the user acknowledged a destructive request.
///
#[derive(Debug, PartialEq, Eq)]
pub struct Confirmed<T>(T);

impl<T> Pending<T> {
    pub fn new(value: T) -> Self {
        Pending(value)
    }

    pub fn get(&self) -> &T {
        &self.0
    }

    /// The only way to obtain a `Confirmed`.
    ///
    pub fn acknowledge(self) -> Confirmed<T> {
        Confirmed(self.0)
    }
}

impl<T> Confirmed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Sequence number of a refetch, taken when the fetch is issued.
///
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct FetchTicket(pub(crate) u64);

/// The full todo set as returned by one refetch.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub ticket: FetchTicket,
    pub todos: Vec<Todo>,
}

/// How a sync request ended.
///
#[derive(Debug)]
pub enum SyncOutcome {
    /// Another sync was already running; nothing was sent.
    Skipped,
    /// The backend ran the sync (possibly with per-item errors) and the
    /// todo set was fetched again.
    Finished {
        report: SyncReport,
        snapshot: Result<Snapshot, GatewayError>,
    },
    Failed(GatewayError),
}

#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn Backend>,
    sync_guard: SyncGuard,
    fetch_sequence: Arc<AtomicU64>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Gateway {
            backend,
            sync_guard: SyncGuard::new(),
            fetch_sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_guard.is_busy()
    }

    /// Return the full todo set, stamped with a fresh ticket.
    ///
    pub async fn fetch(&self) -> Result<Snapshot, GatewayError> {
        let ticket = FetchTicket(self.fetch_sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let todos = self.backend.fetch_todos().await?;
        debug!("Fetched {} todos ({:?})", todos.len(), ticket);
        Ok(Snapshot { ticket, todos })
    }

    pub async fn create(&self, fields: &TodoFields) -> Result<Snapshot, GatewayError> {
        let fields = fields.validated()?;
        let created = self.backend.create_todo(&fields).await?;
        info!("Created todo {}", created.id);
        self.fetch().await
    }

    pub async fn update(&self, id: TodoId, fields: &TodoFields) -> Result<Snapshot, GatewayError> {
        let fields = fields.validated()?;
        self.backend.update_todo(id, &fields).await?;
        info!("Updated todo {}", id);
        self.fetch().await
    }

    pub async fn toggle(&self, id: TodoId) -> Result<Snapshot, GatewayError> {
        let todo = self.backend.toggle_todo(id).await?;
        debug!("Todo {} is now {}", id, if todo.done { "done" } else { "open" });
        self.fetch().await
    }

    pub async fn delete(&self, id: Confirmed<TodoId>) -> Result<Snapshot, GatewayError> {
        let id = id.into_inner();
        self.backend.delete_todo(id).await?;
        info!("Deleted todo {}", id);
        self.fetch().await
    }

    /// Upload the file at `path` as the attachment of the selected todo.
    ///
    pub async fn attach(
        &self,
        selected: Option<TodoId>,
        path: impl AsRef<Path>,
    ) -> Result<Snapshot, GatewayError> {
        let id = selected.ok_or(ValidationError::NoSelection)?;
        let file = AttachmentFile::inspect(path)?;
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| ValidationError::UnreadableFile {
                path: file.path.display().to_string(),
                message: e.to_string(),
            })?;
        attachment_size_unchanged(&file, bytes.len())?;
        self.backend
            .upload_attachment(id, &file.file_name, bytes)
            .await?;
        info!("Attached {} to todo {}", file.file_name, id);
        self.fetch().await
    }

    pub async fn remove_attachment(
        &self,
        id: Confirmed<TodoId>,
    ) -> Result<Snapshot, GatewayError> {
        let id = id.into_inner();
        self.backend.remove_attachment(id).await?;
        info!("Removed attachment of todo {}", id);
        self.fetch().await
    }

    /// Run a sync unless one is already in flight.
    ///
    pub async fn sync(&self) -> SyncOutcome {
        let Some(_permit) = self.sync_guard.try_begin() else {
            debug!("Sync already in progress, ignoring request");
            return SyncOutcome::Skipped;
        };
        match self.backend.sync().await {
            Ok(report) => SyncOutcome::Finished {
                report,
                snapshot: self.fetch().await,
            },
            Err(e) => {
                warn!("Sync failed: {}", e);
                SyncOutcome::Failed(e.into())
            }
        }
    }

    pub async fn sync_status(&self) -> Result<SyncStatus, GatewayError> {
        Ok(self.backend.sync_status().await?)
    }
}

/// The file may have grown between inspection and reading.
fn attachment_size_unchanged(file: &AttachmentFile, read: usize) -> Result<(), ValidationError> {
    crate::todo::attachment::check_size(read as u64).map_err(|e| {
        warn!("{} grew to {} bytes after inspection", file.file_name, read);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TodoStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tokio::sync::Notify;

    /// Backend over an in-memory store that counts requests.
    #[derive(Default)]
    struct FakeBackend {
        store: Mutex<TodoStore>,
        requests: AtomicUsize,
        syncs: AtomicUsize,
        uploads: AtomicUsize,
        sync_started: Notify,
        release_sync: Notify,
        hold_sync: bool,
        sync_report: Mutex<Option<SyncReport>>,
    }

    impl FakeBackend {
        fn hit(&self) {
            self.requests.fetch_add(1, Ordering::SeqCst);
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
            self.hit();
            Ok(self.store.lock().unwrap().list().to_vec())
        }

        async fn create_todo(&self, fields: &TodoFields) -> Result<Todo, ApiError> {
            self.hit();
            Ok(self.store.lock().unwrap().add(fields.clone())?)
        }

        async fn update_todo(&self, id: TodoId, fields: &TodoFields) -> Result<Todo, ApiError> {
            self.hit();
            Ok(self.store.lock().unwrap().update(id, fields.clone())?)
        }

        async fn delete_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
            self.hit();
            Ok(self.store.lock().unwrap().delete(id)?)
        }

        async fn toggle_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
            self.hit();
            Ok(self.store.lock().unwrap().toggle(id)?)
        }

        async fn upload_attachment(
            &self,
            id: TodoId,
            file_name: &str,
            _bytes: Vec<u8>,
        ) -> Result<Todo, ApiError> {
            self.hit();
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .store
                .lock()
                .unwrap()
                .set_attachment(id, Some(format!("abcd1234_{}", file_name)))?)
        }

        async fn remove_attachment(&self, id: TodoId) -> Result<Todo, ApiError> {
            self.hit();
            Ok(self.store.lock().unwrap().set_attachment(id, None)?)
        }

        async fn sync(&self) -> Result<SyncReport, ApiError> {
            self.hit();
            self.syncs.fetch_add(1, Ordering::SeqCst);
            if self.hold_sync {
                self.sync_started.notify_one();
                self.release_sync.notified().await;
            }
            let report = self.sync_report.lock().unwrap().clone();
            report.ok_or(ApiError::Rejected {
                status: 400,
                message: "Todoist API token is not configured".to_string(),
            })
        }

        async fn sync_status(&self) -> Result<SyncStatus, ApiError> {
            self.hit();
            Ok(SyncStatus::default())
        }
    }

    fn gateway() -> (Arc<FakeBackend>, Gateway) {
        let backend = Arc::new(FakeBackend::default());
        let gateway = Gateway::new(backend.clone());
        (backend, gateway)
    }

    #[tokio::test]
    async fn create_then_delete_round_trip() {
        let (backend, gateway) = gateway();
        let todos = gateway.create(&TodoFields::new("  Møde  ")).await.unwrap().todos;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "Møde");
        assert!(!todos[0].done);

        let id = todos[0].id;
        let todos = gateway
            .delete(Pending::new(id).acknowledge())
            .await
            .unwrap()
            .todos;
        assert!(todos.iter().all(|t| t.id != id));
        // two mutations, two refetches
        assert_eq!(backend.requests(), 4);
    }

    #[tokio::test]
    async fn blank_text_never_reaches_backend() {
        let (backend, gateway) = gateway();
        let error = gateway.create(&TodoFields::new(" \t ")).await.unwrap_err();
        assert!(matches!(
            error,
            GatewayError::Validation(ValidationError::EmptyText)
        ));
        assert_eq!(backend.requests(), 0);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let (_backend, gateway) = gateway();
        let todos = gateway.create(&TodoFields::new("Løb en tur")).await.unwrap().todos;
        let id = todos[0].id;
        assert!(gateway.toggle(id).await.unwrap().todos[0].done);
        let todos = gateway.toggle(id).await.unwrap().todos;
        assert!(!todos[0].done);
        assert_eq!(todos[0].fields(), TodoFields::new("Løb en tur"));
    }

    #[tokio::test]
    async fn missing_todo_surfaces_not_found() {
        let (_backend, gateway) = gateway();
        let error = gateway.toggle(42).await.unwrap_err();
        assert_eq!(error.user_message(), "Todo no longer exists");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_without_upload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stor.pdf");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(11 * 1024 * 1024).unwrap();

        let (backend, gateway) = gateway();
        let todos = gateway.create(&TodoFields::new("Kontrakt")).await.unwrap().todos;
        let before = backend.requests();
        let error = gateway.attach(Some(todos[0].id), &path).await.unwrap_err();
        assert!(matches!(
            error,
            GatewayError::Validation(ValidationError::FileTooLarge { .. })
        ));
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
        assert_eq!(backend.requests(), before);
    }

    #[tokio::test]
    async fn attach_requires_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noter.txt");
        std::fs::write(&path, "hej").unwrap();
        let (backend, gateway) = gateway();
        let error = gateway.attach(None, &path).await.unwrap_err();
        assert!(matches!(
            error,
            GatewayError::Validation(ValidationError::NoSelection)
        ));
        assert_eq!(backend.requests(), 0);
    }

    #[tokio::test]
    async fn attach_and_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noter.txt");
        std::fs::write(&path, "hej").unwrap();
        let (backend, gateway) = gateway();
        let id = gateway.create(&TodoFields::new("Noter")).await.unwrap().todos[0].id;

        let todos = gateway.attach(Some(id), &path).await.unwrap().todos;
        assert_eq!(todos[0].attachment.as_deref(), Some("abcd1234_noter.txt"));
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);

        let todos = gateway
            .remove_attachment(Pending::new(id).acknowledge())
            .await
            .unwrap()
            .todos;
        assert_eq!(todos[0].attachment, None);
    }

    #[tokio::test]
    async fn concurrent_sync_sends_one_request() {
        let backend = Arc::new(FakeBackend {
            hold_sync: true,
            sync_report: Mutex::new(Some(SyncReport {
                success: true,
                ..SyncReport::default()
            })),
            ..FakeBackend::default()
        });
        let gateway = Gateway::new(backend.clone());

        let (first, second) = tokio::join!(gateway.sync(), async {
            backend.sync_started.notified().await;
            assert!(gateway.is_syncing());
            let outcome = gateway.sync().await;
            backend.release_sync.notify_one();
            outcome
        });

        assert!(matches!(first, SyncOutcome::Finished { .. }));
        assert!(matches!(second, SyncOutcome::Skipped));
        assert_eq!(backend.syncs.load(Ordering::SeqCst), 1);
        assert!(!gateway.is_syncing());
    }

    #[tokio::test]
    async fn partial_sync_still_refetches() {
        let report = SyncReport {
            success: false,
            pulled: 2,
            pushed: 1,
            updated: 0,
            completed: 1,
            errors: vec!["task X not found remotely".to_string()],
        };
        let backend = Arc::new(FakeBackend {
            sync_report: Mutex::new(Some(report.clone())),
            ..FakeBackend::default()
        });
        let gateway = Gateway::new(backend.clone());

        match gateway.sync().await {
            SyncOutcome::Finished {
                report: got,
                snapshot,
            } => {
                assert_eq!(got, report);
                assert!(snapshot.is_ok());
            }
            other => panic!("unexpected {:?}", other),
        }
        // sync plus refetch
        assert_eq!(backend.requests(), 2);
    }

    #[tokio::test]
    async fn failed_sync_does_not_refetch() {
        let (backend, gateway) = gateway();
        match gateway.sync().await {
            SyncOutcome::Failed(e) => {
                assert_eq!(e.user_message(), "Todoist API token is not configured")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(backend.requests(), 1);
        assert!(!gateway.is_syncing());
    }

    #[tokio::test]
    async fn fetch_tickets_increase() {
        let (_backend, gateway) = gateway();
        let first = gateway.fetch().await.unwrap().ticket;
        let second = gateway.create(&TodoFields::new("Kaffe")).await.unwrap().ticket;
        assert!(second > first);
    }
}
