//! JSON-file todo store backing standalone mode.
//!
//! Every mutation rewrites the file and is undone in memory when the write
//! fails. An in-memory store (no file) is used by tests.

use crate::todo::{Todo, TodoFields, TodoId};
use log::*;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

pub const FILE_NAME: &str = "todos.json";

/// Errors that can occur while loading or saving todos.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Todo id is unknown
    #[error("Todo not found: {id}")]
    NotFound { id: TodoId },

    /// File could not be read or written
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File content is not a todo list
    #[error("Failed to parse {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Owns the todo list and its backing file.
///
#[derive(Debug, Default)]
pub struct TodoStore {
    path: Option<PathBuf>,
    todos: Vec<Todo>,
}

impl TodoStore {
    /// Return a store that is never written to disk.
    ///
    pub fn in_memory() -> Self {
        TodoStore::default()
    }

    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let todos = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if contents.trim().is_empty() {
                vec![]
            } else {
                serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            vec![]
        };
        debug!("Loaded {} todos from {}", todos.len(), path.display());
        Ok(TodoStore {
            path: Some(path),
            todos,
        })
    }

    pub fn list(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Append a new open todo. Ids grow monotonically from the current max.
    ///
    pub fn add(&mut self, fields: TodoFields) -> Result<Todo, StoreError> {
        let id = self.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let todo = Todo::new(id, fields);
        self.push(todo)
    }

    /// Append a todo pulled from the remote service, already linked.
    ///
    pub fn add_linked(&mut self, fields: TodoFields, todoist_id: String) -> Result<Todo, StoreError> {
        let id = self.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let mut todo = Todo::new(id, fields.clone());
        todo.todoist_id = Some(todoist_id);
        todo.sync_base = Some(fields);
        self.push(todo)
    }

    pub fn update(&mut self, id: TodoId, fields: TodoFields) -> Result<Todo, StoreError> {
        self.modify(id, |todo| {
            todo.set_fields(fields);
        })
    }

    pub fn toggle(&mut self, id: TodoId) -> Result<Todo, StoreError> {
        self.modify(id, |todo| todo.done = !todo.done)
    }

    pub fn set_attachment(
        &mut self,
        id: TodoId,
        attachment: Option<String>,
    ) -> Result<Todo, StoreError> {
        self.modify(id, |todo| todo.attachment = attachment)
    }

    /// Record the remote reference and the field set both sides agree on.
    ///
    pub fn link(
        &mut self,
        id: TodoId,
        todoist_id: String,
        base: TodoFields,
    ) -> Result<Todo, StoreError> {
        self.modify(id, |todo| {
            todo.todoist_id = Some(todoist_id);
            todo.sync_base = Some(base);
        })
    }

    pub fn unlink(&mut self, id: TodoId) -> Result<Todo, StoreError> {
        self.modify(id, |todo| {
            todo.todoist_id = None;
            todo.sync_base = None;
        })
    }

    /// Overwrite fields with the remote version and make it the new base.
    ///
    pub fn apply_remote(&mut self, id: TodoId, fields: TodoFields) -> Result<Todo, StoreError> {
        self.modify(id, |todo| {
            todo.set_fields(fields.clone());
            todo.sync_base = Some(fields);
        })
    }

    pub fn set_base(&mut self, id: TodoId, base: TodoFields) -> Result<Todo, StoreError> {
        self.modify(id, |todo| todo.sync_base = Some(base))
    }

    /// Mark done and drop the remote link in one write.
    ///
    pub fn complete_and_unlink(&mut self, id: TodoId) -> Result<Todo, StoreError> {
        self.modify(id, |todo| {
            todo.done = true;
            todo.todoist_id = None;
            todo.sync_base = None;
        })
    }

    pub fn delete(&mut self, id: TodoId) -> Result<Todo, StoreError> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        let removed = self.todos.remove(index);
        if let Err(e) = self.save() {
            self.todos.insert(index, removed);
            return Err(e);
        }
        Ok(removed)
    }

    fn push(&mut self, todo: Todo) -> Result<Todo, StoreError> {
        self.todos.push(todo.clone());
        if let Err(e) = self.save() {
            self.todos.pop();
            return Err(e);
        }
        Ok(todo)
    }

    fn modify(&mut self, id: TodoId, change: impl FnOnce(&mut Todo)) -> Result<Todo, StoreError> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        let mut updated = self.todos[index].clone();
        change(&mut updated);
        let previous = std::mem::replace(&mut self.todos[index], updated.clone());
        if let Err(e) = self.save() {
            warn!("Reverting todo {} after failed write", id);
            self.todos[index] = previous;
            return Err(e);
        }
        Ok(updated)
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_error = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.todos).map_err(|source| {
            StoreError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        let mut file = fs::File::create(path).map_err(io_error)?;
        file.write_all(content.as_bytes()).map_err(io_error)?;
        file.flush().map_err(io_error)?;
        Ok(())
    }
}
