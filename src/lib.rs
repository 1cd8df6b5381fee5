//! Terminal client for personal todos with two-way Todoist synchronization.
//!
//! The client state lives in `state::State` and only changes through
//! `State::apply` (user actions) or the results of `gateway::Gateway`
//! calls. `ui::projection` turns the state into a `ViewModel` that the
//! render modules draw.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod gateway;
pub mod logger;
pub mod state;
pub mod store;
pub mod sync;
pub mod todo;
pub mod todoist;
pub mod ui;
