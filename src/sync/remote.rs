use crate::todo::TodoFields;
use crate::todoist::TodoistError;
use async_trait::async_trait;

/// An open task on the remote service, already mapped to local fields.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteTask {
    pub id: String,
    pub fields: TodoFields,
    /// File name from the attachment note carried in the task content.
    pub note: Option<String>,
}

impl RemoteTask {
    pub fn new(id: impl Into<String>, fields: TodoFields) -> Self {
        RemoteTask {
            id: id.into(),
            fields,
            note: None,
        }
    }
}

/// What the reconciler needs from the remote task service.
///
#[async_trait]
pub trait RemoteTasks: Send {
    /// Load whatever lookup data later calls depend on.
    async fn prepare(&mut self) -> Result<(), TodoistError>;

    /// Return every open task.
    async fn active_tasks(&mut self) -> Result<Vec<RemoteTask>, TodoistError>;

    /// Create a task and return its id.
    async fn create_task(
        &mut self,
        fields: &TodoFields,
        attachment: Option<&str>,
    ) -> Result<String, TodoistError>;

    /// Update a task and return the fields it holds afterwards, which can
    /// differ from `fields` when the service ignores part of the update.
    async fn update_task(
        &mut self,
        id: &str,
        fields: &TodoFields,
        attachment: Option<&str>,
    ) -> Result<TodoFields, TodoistError>;

    async fn close_task(&mut self, id: &str) -> Result<(), TodoistError>;
}
