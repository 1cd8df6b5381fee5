use super::Frame;
use crate::ui::projection::{TodoStatus, ViewModel};
use crate::ui::widgets::styling;
use crate::ui::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render the detail panel of the selected todo.
///
pub fn detail(frame: &mut Frame, size: Rect, view: &ViewModel, theme: &Theme) {
    let block = Block::default()
        .title("Details")
        .borders(Borders::ALL)
        .border_style(styling::normal_block_border_style(theme));

    let Some(detail) = &view.detail else {
        let empty = Paragraph::new(Span::styled(
            "Select a todo to see its details",
            styling::muted_text_style(theme),
        ))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(empty, size);
        return;
    };

    let label = |text: &'static str| Span::styled(text, styling::muted_text_style(theme));
    let status_style = match detail.status {
        TodoStatus::Overdue => styling::overdue_style(theme),
        TodoStatus::Done => Style::default().fg(theme.success.to_color()),
        TodoStatus::Active => Style::default().fg(theme.primary.to_color()),
    };
    let deadline_style = if detail.status == TodoStatus::Overdue {
        styling::overdue_style(theme)
    } else {
        styling::normal_text_style(theme)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            detail.text.as_str(),
            styling::active_list_item_style(theme),
        )),
        Line::from(""),
        Line::from(vec![
            label("Category  "),
            Span::styled(detail.category.as_str(), styling::normal_text_style(theme)),
        ]),
        Line::from(vec![
            label("Priority  "),
            Span::styled(
                detail.priority.as_str(),
                styling::priority_style(theme, detail.priority),
            ),
        ]),
        Line::from(vec![
            label("Deadline  "),
            Span::styled(detail.deadline.as_str(), deadline_style),
        ]),
        Line::from(vec![
            label("Status    "),
            Span::styled(detail.status.label(), status_style),
        ]),
    ];
    if detail.linked {
        lines.push(Line::from(vec![
            label("Todoist   "),
            Span::styled("linked", styling::muted_text_style(theme)),
        ]));
    }
    lines.push(Line::from(""));
    match &detail.attachment {
        Some(attachment) => {
            let icon = if attachment.is_image { "🖼" } else { "📄" };
            lines.push(Line::from(vec![
                label("File      "),
                Span::styled(
                    format!("{} {}", icon, attachment.display_name),
                    styling::normal_text_style(theme),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("          {}", attachment.stored),
                styling::muted_text_style(theme),
            )));
        }
        None => lines.push(Line::from(vec![
            label("File      "),
            Span::styled("(none)", styling::muted_text_style(theme)),
        ])),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label("Toggle: "),
        Span::styled(detail.toggle_label, styling::normal_text_style(theme)),
    ]));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, size);
}
