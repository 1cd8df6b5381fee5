use super::Frame;
use crate::state::Prompt;
use crate::ui::projection::ViewModel;
use crate::ui::widgets::{spinner::spinner, styling};
use crate::ui::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the title bar with the sync indicator and the loading spinner.
///
pub fn header(
    frame: &mut Frame,
    size: Rect,
    view: &ViewModel,
    spinner_index: usize,
    theme: &Theme,
) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(" ☑ ", styling::active_list_item_style(theme)),
        Span::styled("Todo", styling::active_block_title_style()),
    ]));

    let mut right = Vec::new();
    if view.loading || view.sync.in_progress {
        right.push(spinner(spinner_index, styling::active_list_item_style(theme)));
        right.push(Span::raw(" "));
    }
    right.push(Span::styled(
        format!("{} ", view.sync.label()),
        styling::muted_text_style(theme),
    ));
    let right = Line::from(right);
    let right_width = right.width() as u16;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(right_width)])
        .split(size);
    frame.render_widget(title, columns[0]);
    frame.render_widget(
        Paragraph::new(right).alignment(Alignment::Right),
        columns[1],
    );
}

/// Render the open prompt, or the latest notice next to the totals.
///
pub fn status_line(
    frame: &mut Frame,
    size: Rect,
    view: &ViewModel,
    prompt: Option<&Prompt>,
    theme: &Theme,
) {
    let left = match prompt {
        Some(Prompt::Search { .. }) => Line::from(vec![
            Span::styled(" / ", styling::active_list_item_style(theme)),
            Span::styled(format!("{}▏", view.search), styling::normal_text_style(theme)),
        ]),
        Some(Prompt::AttachPath { path, .. }) => Line::from(vec![
            Span::styled(" File path: ", styling::active_list_item_style(theme)),
            Span::styled(format!("{}▏", path), styling::normal_text_style(theme)),
        ]),
        None => match &view.notice {
            Some(notice) => Line::from(Span::styled(
                format!(" {}", notice.text),
                styling::notice_style(theme, notice.kind),
            )),
            None => Line::from(""),
        },
    };

    let totals = Line::from(Span::styled(
        format!("{} ", view.status_bar.text()),
        styling::muted_text_style(theme),
    ));
    let totals_width = totals.width() as u16;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(totals_width)])
        .split(size);
    frame.render_widget(Paragraph::new(left), columns[0]);
    frame.render_widget(
        Paragraph::new(totals).alignment(Alignment::Right),
        columns[1],
    );
}
