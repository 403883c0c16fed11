//! Status bar with keybindings and state indicators, plus the error line

use crate::config::SerialOption;
use crate::controller::ErrorReport;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// What the status bar needs to know about the app
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub current: usize,
    pub target: usize,
    pub total: usize,
    /// Digits typed ahead of `s`
    pub count_buffer: &'a str,
    /// Option being edited and the text typed so far
    pub editing: Option<(SerialOption, &'a str)>,
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let bar_style = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let is_sending = data.current < data.target.min(data.total);
    let is_at_end = data.current >= data.total;

    let badge_color = if data.editing.is_some() {
        DEFAULT_THEME.secondary
    } else if is_at_end {
        DEFAULT_THEME.success
    } else {
        DEFAULT_THEME.primary
    };

    let mut left_spans = vec![
        Span::styled(
            format!(" Step {}/{} ", data.current, data.total),
            Style::default()
                .bg(badge_color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", bar_style.fg(DEFAULT_THEME.comment)),
    ];

    match data.editing {
        Some((option, input)) if input.is_empty() => {
            left_spans.push(Span::styled(
                format!(" {} ", option.placeholder()),
                bar_style.fg(DEFAULT_THEME.comment).add_modifier(Modifier::ITALIC),
            ));
        }
        Some((option, input)) => {
            left_spans.push(Span::styled(
                format!(" {}: {}▏", option.name(), input),
                bar_style.fg(DEFAULT_THEME.fg).add_modifier(Modifier::BOLD),
            ));
        }
        None => {
            left_spans.push(Span::styled(
                format!(" {} ", data.message),
                bar_style.fg(DEFAULT_THEME.fg),
            ));
        }
    }

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(bar_style)
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar_style.fg(DEFAULT_THEME.fg);
    let sep_style = bar_style.fg(DEFAULT_THEME.comment);

    let mut right_spans = if data.editing.is_some() {
        vec![
            Span::styled(" ↵ ", key_style),
            Span::styled(" apply ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" esc ", key_style),
            Span::styled(" cancel ", desc_style),
        ]
    } else {
        let option_keys: String = SerialOption::ALL
            .iter()
            .map(|option| option.key().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        vec![
            Span::styled(" [n]s ", key_style),
            Span::styled(" step ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" e ", key_style),
            Span::styled(" send all ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" x ", key_style),
            Span::styled(" stop ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(format!(" {} ", option_keys), key_style),
            Span::styled(" serial ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" o ", key_style),
            Span::styled(" open ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled("q", key_style),
            Span::styled(" quit ", desc_style),
        ]
    };

    if !data.count_buffer.is_empty() {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            format!(" {} ", data.count_buffer),
            desc_style.add_modifier(Modifier::ITALIC),
        ));
    }

    let indicator = if is_sending {
        Some((" ▶ SENDING ", DEFAULT_THEME.secondary))
    } else if is_at_end {
        Some((" END ", DEFAULT_THEME.error))
    } else if data.current == 0 {
        Some((" START ", DEFAULT_THEME.success))
    } else {
        None
    };

    if let Some((label, color)) = indicator {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            label,
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(bar_style)
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}

/// Render the most recent error, if any, with the time it happened.
pub fn render_error_line(frame: &mut Frame, area: Rect, error: Option<&ErrorReport>) {
    let Some(error) = error else {
        return;
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" [{}] ", error.at.format("%H:%M:%S")),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            error.message.as_str(),
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}
