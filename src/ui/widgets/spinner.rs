use ratatui::{style::Style, text::Span};

/// Braille frames shown while requests are in flight.
pub const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Return the spinner frame for the index as a styled span.
///
pub fn spinner(index: usize, style: Style) -> Span<'static> {
    Span::styled(FRAMES[index % FRAMES.len()], style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_wraps() {
        let style = Style::default();
        assert_eq!(spinner(FRAMES.len() + 1, style).content, FRAMES[1]);
    }
}
