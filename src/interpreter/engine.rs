// Execution engine for the HP-GL interpreter

use crate::interpreter::errors::InterpretError;
use crate::parser::instruction::Instruction;
use crate::parser::lexer::LexerContext;

/// Pen position and pen state as the plotter should see them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlotterState {
    pub x: i64,
    pub y: i64,
    pub pen_down: bool,
}

impl PlotterState {
    /// Power-on state: origin, pen up
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one instruction.
    ///
    /// On error the state is left untouched.
    pub fn apply(&mut self, instruction: &Instruction) -> Result<(), InterpretError> {
        match instruction.command.as_str() {
            "PA" => {
                let (x, y) = if instruction.argument.is_empty() {
                    (0, 0)
                } else {
                    parse_coordinate(instruction)?
                };
                self.x = x;
                self.y = y;
            }
            "PR" => {
                if !instruction.argument.is_empty() {
                    let (dx, dy) = parse_coordinate(instruction)?;
                    self.x = self.x.saturating_add(dx);
                    self.y = self.y.saturating_add(dy);
                }
            }
            "PU" => self.pen_down = false,
            "PD" => self.pen_down = true,
            _ => {}
        }
        Ok(())
    }

    /// Functional form of [`PlotterState::apply`].
    pub fn applied(mut self, instruction: &Instruction) -> Result<Self, InterpretError> {
        self.apply(instruction)?;
        Ok(self)
    }
}

/// Parse an `x,y` argument. Exactly two fields are accepted.
fn parse_coordinate(instruction: &Instruction) -> Result<(i64, i64), InterpretError> {
    let invalid = || InterpretError::InvalidNumericArgument {
        command: instruction.command.clone(),
        argument: instruction.argument.clone(),
    };

    let mut fields = instruction.argument.split(',');
    let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(invalid());
    };

    let x = x.parse::<i64>().map_err(|_| invalid())?;
    let y = y.parse::<i64>().map_err(|_| invalid())?;
    Ok((x, y))
}

/// Everything an instruction can change while a program plays back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Machine {
    pub lexer: LexerContext,
    pub plotter: PlotterState,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one instruction through both the terminator hook and the plotter.
    ///
    /// The terminator update always happens, even when the positional
    /// transition fails.
    pub fn run_instruction(&mut self, instruction: &Instruction) -> Result<(), InterpretError> {
        self.lexer.observe(instruction);
        self.plotter.apply(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{tokenize, Lexer, DEFAULT_TERMINATOR};

    fn instruction(command: &str, argument: &str) -> Instruction {
        Instruction::new(command, argument, format!("{command}{argument};"))
    }

    #[test]
    fn test_absolute_and_relative_moves() {
        let mut state = PlotterState::new();

        state.apply(&instruction("PA", "10,20")).unwrap();
        assert_eq!(state, PlotterState { x: 10, y: 20, pen_down: false });

        state.apply(&instruction("PR", "5,-5")).unwrap();
        assert_eq!(state, PlotterState { x: 15, y: 15, pen_down: false });

        state.apply(&instruction("PA", "")).unwrap();
        assert_eq!(state, PlotterState { x: 0, y: 0, pen_down: false });
    }

    #[test]
    fn test_pen_commands() {
        let mut state = PlotterState::new();
        state.apply(&instruction("PD", "")).unwrap();
        assert!(state.pen_down);
        state.apply(&instruction("PU", "1,1")).unwrap();
        assert!(!state.pen_down);
    }

    #[test]
    fn test_empty_relative_move_is_noop() {
        let state = PlotterState { x: 3, y: 4, pen_down: true };
        assert_eq!(state.applied(&instruction("PR", "")).unwrap(), state);
    }

    #[test]
    fn test_unknown_commands_pass_through() {
        let state = PlotterState { x: 1, y: 2, pen_down: true };
        assert_eq!(state.applied(&instruction("SP", "2")).unwrap(), state);
        assert_eq!(state.applied(&instruction("LB", "1,x")).unwrap(), state);
    }

    #[test]
    fn test_invalid_numbers_leave_state_unchanged() {
        let mut state = PlotterState { x: 7, y: 8, pen_down: false };

        for argument in ["a,1", "1,b", "1", "1,2,3", "1.5,2", " 1,2"] {
            let err = state.apply(&instruction("PA", argument)).unwrap_err();
            assert_eq!(
                err,
                InterpretError::InvalidNumericArgument {
                    command: "PA".to_string(),
                    argument: argument.to_string(),
                }
            );
            assert_eq!(state, PlotterState { x: 7, y: 8, pen_down: false });
        }

        assert!(state.apply(&instruction("PR", "1,")).is_err());
        assert_eq!(state, PlotterState { x: 7, y: 8, pen_down: false });
    }

    #[test]
    fn test_machine_tracks_terminator_and_position() {
        let mut machine = Machine::new();
        for instruction in tokenize("DT$;PA3,4;PD;") {
            machine.run_instruction(&instruction).unwrap();
        }
        assert_eq!(machine.lexer.terminator, b'$');
        assert_eq!(machine.plotter, PlotterState { x: 3, y: 4, pen_down: true });

        machine.run_instruction(&instruction("DT", "")).unwrap();
        assert_eq!(machine.lexer.terminator, DEFAULT_TERMINATOR);
    }

    #[test]
    fn test_machine_updates_terminator_even_on_error() {
        let mut machine = Machine::new();
        let dt = instruction("DT", "%");
        machine.run_instruction(&dt).unwrap();
        assert!(machine.run_instruction(&instruction("PA", "x,y")).is_err());
        assert_eq!(machine.lexer.terminator, b'%');
    }

    #[test]
    fn test_playback_keeps_high_byte_terminator() {
        let mut machine = Machine::new();
        for instruction in Lexer::from_bytes(b"DT\xff;LBab\xffPU;").tokenize() {
            machine.run_instruction(&instruction).unwrap();
        }
        assert_eq!(machine.lexer.terminator, 0xff);
    }
}
