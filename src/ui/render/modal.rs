use super::Frame;
use crate::config::Keymap;
use crate::state::{Confirmation, EditModal, FormField, InputContext, State};
use crate::ui::widgets::styling;
use crate::ui::{centered_rect, Theme};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render the create/edit modal on top of the screen.
///
pub fn edit_modal(frame: &mut Frame, area: Rect, modal: &EditModal, theme: &Theme) {
    let form = &modal.form;
    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let focused = form.focus == field;
        let value = match field {
            FormField::Text => format!("{}{}", form.text, if focused { "▏" } else { "" }),
            FormField::Category => format!(
                "‹ {} ›",
                form.category.map(|c| c.as_str()).unwrap_or("(none)")
            ),
            FormField::Priority => format!("‹ {} ›", form.priority.as_str()),
            FormField::Deadline => {
                format!("{}{}", form.deadline, if focused { "▏" } else { "" })
            }
        };
        let (marker, label_style, value_style) = if focused {
            (
                "▶ ",
                styling::active_list_item_style(theme),
                styling::selected_list_item_style(theme),
            )
        } else {
            (
                "  ",
                styling::muted_text_style(theme),
                styling::normal_text_style(theme),
            )
        };
        let value_style = match field {
            FormField::Priority if !focused => styling::priority_style(theme, form.priority),
            _ => value_style,
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, field.label()),
            label_style,
        )));
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(value, value_style),
        ]));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(modal.title())
        .borders(Borders::ALL)
        .border_style(styling::active_block_border_style(theme))
        .title_style(styling::active_block_title_style());
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Render the yes/no question for a destructive request.
///
pub fn confirmation(
    frame: &mut Frame,
    size: Rect,
    pending: &Confirmation,
    state: &State,
    theme: &Theme,
    keymap: &Keymap,
) {
    let text = state
        .todos()
        .iter()
        .find(|todo| todo.id == pending.todo_id())
        .map(|todo| todo.text.as_str())
        .unwrap_or_default();
    let question = match pending {
        Confirmation::DeleteTodo(_) => format!("Delete todo \"{}\"?", text),
        Confirmation::RemoveAttachment(_) => {
            format!("Remove the attachment of \"{}\"?", text)
        }
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(question, styling::normal_text_style(theme))),
        Line::from(""),
        Line::from(Span::styled(
            keymap.footer_text(InputContext::Confirm),
            styling::muted_text_style(theme),
        )),
    ];
    let area = centered_rect(50, 25, size);
    let block = Block::default()
        .title("Confirm")
        .borders(Borders::ALL)
        .border_style(styling::overdue_style(theme));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}
