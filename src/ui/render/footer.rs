use super::Frame;
use crate::config::Keymap;
use crate::state::{InputContext, Prompt, State};
use crate::ui::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Return the mode badge and its background for the active input context.
///
fn mode_badge(state: &State, theme: &Theme) -> (&'static str, Style) {
    let (label, color) = match state.input_context() {
        InputContext::List => ("LIST:", theme.primary),
        InputContext::Modal => ("EDIT:", theme.accent),
        InputContext::Prompt => match state.prompt() {
            Some(Prompt::Search { .. }) => ("SEARCH:", theme.info),
            _ => ("PROMPT:", theme.info),
        },
        InputContext::Confirm => ("CONFIRM:", theme.error),
    };
    (
        label,
        Style::default()
            .fg(theme.highlight_fg.to_color())
            .bg(color.to_color())
            .add_modifier(Modifier::BOLD),
    )
}

/// Render footer widget.
///
pub fn footer(frame: &mut Frame, size: Rect, state: &State, theme: &Theme, keymap: &Keymap) {
    let context = state.input_context();
    let controls_text = match context {
        InputContext::Modal | InputContext::Prompt => {
            format!(" Type to edit,{}", keymap.footer_text(context))
        }
        _ => keymap.footer_text(context),
    };

    let (label, badge_style) = mode_badge(state, theme);
    let controls_content = Line::from(vec![
        Span::styled(label, badge_style),
        Span::styled(
            controls_text,
            Style::default().fg(theme.warning.to_color()),
        ),
    ]);
    let controls_widget = Paragraph::new(controls_content).alignment(Alignment::Left);

    // Show the search query while one is set, otherwise the version
    let query = &state.query().search;
    let right_content = if !query.is_empty() {
        Line::from(vec![Span::styled(
            format!("/{}", query),
            Style::default().fg(theme.text_muted.to_color()),
        )])
    } else {
        Line::from(vec![Span::styled(
            format!(" {}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.accent.to_color()),
        )])
    };

    let right_content_width = right_content.width();
    let right_widget = Paragraph::new(right_content).alignment(Alignment::Right);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(right_content_width.try_into().unwrap_or(0)),
        ])
        .split(size);

    frame.render_widget(controls_widget, columns[0]);
    frame.render_widget(right_widget, columns[1]);
}
