mod detail;
mod footer;
mod list;
mod log;
mod modal;
mod sidebar;
mod status;

use self::log::log;
use super::projection::ViewModel;
use super::{Frame, Theme};
use crate::config::Keymap;
use crate::state::State;
use detail::detail;
use footer::footer;
use list::list;
use modal::{confirmation, edit_modal};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use sidebar::sidebar;
use status::{header, status_line};

/// Height of the log panel when it is shown.
const LOG_PANEL_HEIGHT: u16 = 8;

/// Width of the category sidebar.
const SIDEBAR_WIDTH: u16 = 22;

/// Render the whole screen from the projected view.
///
pub fn render(frame: &mut Frame, state: &State, theme: &Theme, keymap: &Keymap) {
    let view = state.view(state.today());
    let size = frame.size();

    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(1),
        Constraint::Length(1),
    ];
    if state.show_log() {
        constraints.insert(2, Constraint::Length(LOG_PANEL_HEIGHT));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    header(frame, rows[0], &view, state.spinner_index(), theme);
    body(frame, rows[1], &view, theme);
    if state.show_log() {
        log(frame, rows[2], state, theme);
    }
    let last = rows.len();
    status_line(frame, rows[last - 2], &view, state.prompt(), theme);
    footer(frame, rows[last - 1], state, theme, keymap);

    if let Some(modal) = state.modal() {
        edit_modal(frame, super::modal_area(size), modal, theme);
    }
    if let Some(pending) = state.confirmation() {
        confirmation(frame, size, pending, state, theme, keymap);
    }
}

fn body(frame: &mut Frame, size: Rect, view: &ViewModel, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Min(20),
            Constraint::Percentage(35),
        ])
        .split(size);
    sidebar(frame, columns[0], view, theme);
    list(frame, columns[1], view, theme);
    detail(frame, columns[2], view, theme);
}
