//! User interface module.
//!
//! This module handles all UI rendering using the `ratatui` library, including:
//! - The pure projection from state to `ViewModel`
//! - Terminal rendering and layout
//! - Theme management
//! - Widget components (spinner, styling)

type Frame<'a> = ratatui::Frame<'a>;

pub mod projection;
mod render;
mod theme;
mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const SPINNER_FRAME_COUNT: usize = widgets::spinner::FRAMES.len();

pub use projection::ViewModel;
pub use render::render;
pub use theme::Theme;

/// Return the area of the edit modal for a terminal of the given size.
/// Mouse handling uses it to detect clicks outside the modal.
///
pub fn modal_area(size: Rect) -> Rect {
    centered_rect(60, 60, size)
}

/// Return a rectangle centered in `r` with the given percentages.
///
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
