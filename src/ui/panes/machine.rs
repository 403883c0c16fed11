//! Plotter state pane: pen position, pen state and label terminator

use crate::interpreter::engine::Machine;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

/// Printable form of the label terminator, e.g. `'\u{3}'` or `'#'`.
pub fn terminator_label(terminator: u8) -> String {
    format!("{:?}", terminator as char)
}

/// Render the X / Y / PEN / ETX table
pub fn render_machine_pane(frame: &mut Frame, area: Rect, machine: &Machine) {
    let header_style = Style::default()
        .fg(DEFAULT_THEME.comment)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(vec!["X", "Y", "PEN", "ETX"]).style(header_style);

    let pen = if machine.plotter.pen_down {
        Cell::from("down").style(Style::default().fg(DEFAULT_THEME.success))
    } else {
        Cell::from("up").style(Style::default().fg(DEFAULT_THEME.fg))
    };
    let number_style = Style::default().fg(DEFAULT_THEME.number);

    let row = Row::new(vec![
        Cell::from(machine.plotter.x.to_string()).style(number_style),
        Cell::from(machine.plotter.y.to_string()).style(number_style),
        pen,
        Cell::from(terminator_label(machine.lexer.terminator)),
    ]);

    let widths = [
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(vec![row], widths).header(header).block(
        Block::default()
            .title(" Plotter ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DEFAULT_THEME.border_normal)),
    );

    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_label_escapes_control_bytes() {
        assert_eq!(terminator_label(0x03), "'\\u{3}'");
        assert_eq!(terminator_label(b'#'), "'#'");
    }
}
