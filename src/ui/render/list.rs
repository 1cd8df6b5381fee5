use super::Frame;
use crate::ui::projection::{TodoRow, ViewModel};
use crate::ui::widgets::styling;
use crate::ui::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

/// Render the filtered and sorted todo list.
///
pub fn list(frame: &mut Frame, size: Rect, view: &ViewModel, theme: &Theme) {
    let title = format!("Todos ({})", view.rows.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styling::active_block_border_style(theme))
        .title_style(styling::active_block_title_style());

    if view.rows.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("☐", styling::muted_text_style(theme))),
            Line::from(Span::styled(
                "No todos found",
                styling::normal_text_style(theme),
            )),
            Line::from(Span::styled(
                "Add a new todo or pick another category",
                styling::muted_text_style(theme),
            )),
        ];
        let empty = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, size);
        return;
    }

    let items: Vec<ListItem> = view.rows.iter().map(|row| item(row, theme)).collect();
    let mut list_state = ListState::default();
    list_state.select(view.rows.iter().position(|row| row.selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(styling::selected_list_item_style(theme));
    frame.render_stateful_widget(list, size, &mut list_state);
}

fn item<'a>(row: &'a TodoRow, theme: &Theme) -> ListItem<'a> {
    let checkbox = if row.done { "[✓] " } else { "[ ] " };
    let text_style = if row.done {
        styling::done_text_style(theme)
    } else if row.overdue {
        styling::overdue_style(theme)
    } else {
        styling::normal_text_style(theme)
    };

    let mut meta = vec![
        Span::raw("    "),
        Span::styled(
            row.priority.as_str(),
            styling::priority_style(theme, row.priority),
        ),
    ];
    if let Some(category) = &row.category {
        meta.push(Span::styled(
            format!("  {}", category),
            styling::muted_text_style(theme),
        ));
    }
    if let Some(deadline) = &row.deadline {
        let style = if row.overdue {
            styling::overdue_style(theme)
        } else {
            styling::muted_text_style(theme)
        };
        meta.push(Span::styled(format!("  {}", deadline), style));
    }
    if row.has_attachment {
        meta.push(Span::styled("  📎 File", styling::muted_text_style(theme)));
    }

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(checkbox, styling::muted_text_style(theme)),
            Span::styled(row.text.as_str(), text_style),
        ]),
        Line::from(meta),
    ])
}
