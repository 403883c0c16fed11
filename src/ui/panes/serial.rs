//! Serial line summary: current settings and the size of the last write

use crate::config::{SerialOption, SerialSettings};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

pub fn render_serial_line(
    frame: &mut Frame,
    area: Rect,
    settings: &SerialSettings,
    port_open: bool,
    bytes_written: Option<usize>,
) {
    // Green once a port is attached, orange for a dry run
    let color = if port_open {
        DEFAULT_THEME.success
    } else {
        DEFAULT_THEME.secondary
    };

    let mut spans: Vec<Span> = Vec::new();
    for option in SerialOption::ALL {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("{}: {}", option.name(), settings.get_option(option)),
            Style::default().fg(color),
        ));
    }

    if let Some(bytes) = bytes_written {
        spans.push(Span::styled(
            format!("    {} b written", bytes),
            Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
