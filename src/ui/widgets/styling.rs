use crate::state::NoticeKind;
use crate::todo::Priority;
use crate::ui::theme::Theme;
use ratatui::style::{Modifier, Style};

/// Return the border style for active blocks.
///
pub fn active_block_border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.border_active.to_color())
}

/// Return the border style for normal blocks.
///
pub fn normal_block_border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.border_normal.to_color())
}

/// Return the title style for active blocks.
///
pub fn active_block_title_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Return the style for the selected list item.
///
pub fn selected_list_item_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.highlight_fg.to_color())
        .bg(theme.highlight_bg.to_color())
        .add_modifier(Modifier::BOLD)
}

/// Return the style for active sidebar entries.
///
pub fn active_list_item_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.primary.to_color())
        .add_modifier(Modifier::BOLD)
}

/// Return the style for normal text.
///
pub fn normal_text_style(theme: &Theme) -> Style {
    Style::default().fg(theme.text.to_color())
}

pub fn muted_text_style(theme: &Theme) -> Style {
    Style::default().fg(theme.text_muted.to_color())
}

/// Completed todos are dimmed and struck through.
///
pub fn done_text_style(theme: &Theme) -> Style {
    muted_text_style(theme).add_modifier(Modifier::CROSSED_OUT)
}

pub fn overdue_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.error.to_color())
        .add_modifier(Modifier::BOLD)
}

/// High is red, medium amber, low green.
///
pub fn priority_style(theme: &Theme, priority: Priority) -> Style {
    let color = match priority {
        Priority::High => theme.error,
        Priority::Medium => theme.warning,
        Priority::Low => theme.success,
    };
    Style::default().fg(color.to_color())
}

pub fn notice_style(theme: &Theme, kind: NoticeKind) -> Style {
    let color = match kind {
        NoticeKind::Info => theme.info,
        NoticeKind::Success => theme.success,
        NoticeKind::Warning => theme.warning,
        NoticeKind::Error => theme.error,
    };
    Style::default().fg(color.to_color()).add_modifier(Modifier::BOLD)
}
