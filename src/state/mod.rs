//! Application state management module.
//!
//! This module contains the view state machine:
//! - Main `State` struct and its single transition entry point
//! - Named user actions
//! - Edit form and view types (modal, prompts, confirmations, notices)

mod action;
mod form;
mod view;

pub use action::Action;
pub use form::{FormField, TodoForm};
pub use view::{Confirmation, EditModal, FormTarget, InputContext, Notice, NoticeKind, Prompt};

#[path = "state_impl.rs"]
mod state_impl;

pub use state_impl::State;
