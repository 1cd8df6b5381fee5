//! View-related state types: input context, modal, prompts, confirmations
//! and notices.

use super::form::TodoForm;
use crate::todo::{Todo, TodoId};

/// Which key bindings are active.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum InputContext {
    List,
    Modal,
    Prompt,
    Confirm,
}

/// What the edit modal is editing.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FormTarget {
    New,
    Existing(TodoId),
}

/// The open edit modal. A closed modal is `None` in `State`.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EditModal {
    pub target: FormTarget,
    pub form: TodoForm,
}

impl EditModal {
    pub fn new_todo() -> Self {
        EditModal {
            target: FormTarget::New,
            form: TodoForm::default(),
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        EditModal {
            target: FormTarget::Existing(todo.id),
            form: TodoForm::from_todo(todo),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.target {
            FormTarget::New => "New todo",
            FormTarget::Existing(_) => "Edit todo",
        }
    }
}

/// Single-line prompts shown in the footer.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Prompt {
    /// Live search; keeps the text to restore on cancel.
    Search { previous: String },
    AttachPath { id: TodoId, path: String },
}

/// Destructive requests awaiting an answer.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Confirmation {
    DeleteTodo(TodoId),
    RemoveAttachment(TodoId),
}

impl Confirmation {
    pub fn todo_id(&self) -> TodoId {
        match self {
            Confirmation::DeleteTodo(id) | Confirmation::RemoveAttachment(id) => *id,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One-line message shown in the status area until replaced.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            kind,
        }
    }
}
