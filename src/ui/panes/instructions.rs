//! Instruction list pane
//!
//! Shows a window of the program centered on the next instruction to send.
//! Sent instructions are dimmed blue, the next one is highlighted, pending
//! ones are italic. The line number of the target instruction is marked so
//! the operator can see where playback will stop.

use crate::parser::instruction::Instruction;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// First index to show so that `current` sits in the middle of `height` rows.
pub fn window_start(current: usize, total: usize, height: usize) -> usize {
    let padding = height.saturating_sub(1).div_ceil(2);
    let start = current.saturating_sub(padding);
    // Fill the pane when close to the end of the program
    start.min(total.saturating_sub(height))
}

/// Render the instruction list
pub fn render_instruction_pane(
    frame: &mut Frame,
    area: Rect,
    instructions: &[Instruction],
    current: usize,
    target: usize,
) {
    let title = format!(" Instructions {}/{} ", current, instructions.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    if instructions.is_empty() {
        let paragraph = Paragraph::new("(no instructions)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders
    let start = window_start(current, instructions.len(), visible_height);

    let lines: Vec<Line> = instructions
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_height)
        .map(|(idx, instruction)| {
            let num_style = if idx == target {
                Style::default()
                    .fg(DEFAULT_THEME.target)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let text_style = if idx < current {
                Style::default().fg(DEFAULT_THEME.primary)
            } else if idx == current {
                Style::default()
                    .fg(DEFAULT_THEME.success)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(DEFAULT_THEME.fg)
                    .add_modifier(Modifier::ITALIC)
            };

            Line::from(vec![
                Span::styled(format!("{:4} ", idx), num_style),
                Span::styled(instruction.to_string(), text_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
