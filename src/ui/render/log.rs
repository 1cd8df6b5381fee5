use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use crate::ui::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

/// Render log widget with the most recent entries.
///
pub fn log(frame: &mut Frame, size: Rect, state: &State, theme: &Theme) {
    let block = Block::default()
        .title("Log")
        .borders(Borders::ALL)
        .border_style(styling::normal_block_border_style(theme));

    let capacity = size.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = state
        .log_lines(capacity)
        .into_iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![Span::styled(
                entry,
                styling::muted_text_style(theme),
            )]))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, size);
}
