use super::Frame;
use crate::filter::StatusFilter;
use crate::ui::projection::ViewModel;
use crate::ui::widgets::styling;
use crate::ui::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Render the category list and the status filters.
///
pub fn sidebar(frame: &mut Frame, size: Rect, view: &ViewModel, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(size);

    let items: Vec<ListItem> = view
        .sidebar
        .iter()
        .map(|entry| {
            let style = if entry.active {
                styling::active_list_item_style(theme)
            } else {
                styling::normal_text_style(theme)
            };
            let count = if entry.count > 0 {
                entry.count.to_string()
            } else {
                String::new()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {:<10}", entry.icon, entry.label), style),
                Span::styled(format!("{:>4}", count), styling::muted_text_style(theme)),
            ]))
        })
        .collect();
    let categories = List::new(items).block(
        Block::default()
            .title("Categories")
            .borders(Borders::ALL)
            .border_style(styling::normal_block_border_style(theme)),
    );
    frame.render_widget(categories, rows[0]);

    let filters = [
        (StatusFilter::Done, "1", "Done"),
        (StatusFilter::Active, "2", "Active"),
        (StatusFilter::Overdue, "3", "Overdue"),
    ];
    let mut lines: Vec<Line> = filters
        .iter()
        .map(|(filter, key, label)| {
            let style = if view.status_filter == *filter {
                styling::active_list_item_style(theme)
            } else {
                styling::normal_text_style(theme)
            };
            Line::from(vec![
                Span::styled(format!("{} ", key), styling::muted_text_style(theme)),
                Span::styled(label.to_string(), style),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Sort: ", styling::muted_text_style(theme)),
        Span::styled(view.sort.to_string(), styling::normal_text_style(theme)),
    ]));
    let status = Paragraph::new(lines).block(
        Block::default()
            .title("Filter")
            .borders(Borders::ALL)
            .border_style(styling::normal_block_border_style(theme)),
    );
    frame.render_widget(status, rows[1]);
}
