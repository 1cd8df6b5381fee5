//! Named user actions.
//!
//! Keys are bound to actions by the keymap; `State::apply` maps each action
//! to its transition.

use serde::{Deserialize, Serialize};

/// Every discrete action a user can trigger.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // List
    SelectNext,
    SelectPrevious,
    NextCategory,
    PreviousCategory,
    FilterDone,
    FilterActive,
    FilterOverdue,
    CycleSort,
    Search,
    Create,
    Edit,
    ToggleDone,
    Delete,
    Attach,
    RemoveAttachment,
    Sync,
    Refresh,
    ToggleLog,
    Quit,

    // Edit modal
    NextField,
    PreviousField,
    NextOption,
    PreviousOption,
    CloseModal,

    // Shared by modal, prompts and confirmations
    Submit,
    Cancel,
    Confirm,
}

impl Action {
    /// Short label used in the footer and the log.
    ///
    pub fn label(&self) -> &'static str {
        match self {
            Action::SelectNext => "next",
            Action::SelectPrevious => "previous",
            Action::NextCategory => "next category",
            Action::PreviousCategory => "previous category",
            Action::FilterDone => "done",
            Action::FilterActive => "active",
            Action::FilterOverdue => "overdue",
            Action::CycleSort => "sort",
            Action::Search => "search",
            Action::Create => "add",
            Action::Edit => "edit",
            Action::ToggleDone => "toggle",
            Action::Delete => "delete",
            Action::Attach => "attach",
            Action::RemoveAttachment => "detach",
            Action::Sync => "sync",
            Action::Refresh => "refresh",
            Action::ToggleLog => "log",
            Action::Quit => "quit",
            Action::NextField => "next field",
            Action::PreviousField => "previous field",
            Action::NextOption => "next option",
            Action::PreviousOption => "previous option",
            Action::CloseModal => "close",
            Action::Submit => "save",
            Action::Cancel => "cancel",
            Action::Confirm => "confirm",
        }
    }
}
