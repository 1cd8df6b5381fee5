//! Event handling module.
//!
//! This module contains handlers for different types of events:
//! - Network events: mutation gateway calls run off the UI thread
//! - Terminal events: key presses, mouse clicks and ticks

pub mod network;
pub mod terminal;
