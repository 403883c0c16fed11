//! Lexer (tokenizer) for HP-GL command streams
//!
//! HP-GL is lexed in a single left-to-right pass over raw bytes. Most commands
//! are a two letter mnemonic followed by an argument and a `;`, but label
//! commands (`LB`, `BL`) take free text that runs until a terminator byte.
//! That terminator is itself redefined in-band by `DT`, so lexing an
//! instruction can change how every following byte is read. The mutable part
//! of the lexer is kept in a [`LexerContext`] that is updated as soon as each
//! instruction is complete, before scanning resumes.

use super::instruction::{is_label_command, Instruction, DEFINE_TERMINATOR};

/// ETX, the power-on label terminator.
pub const DEFAULT_TERMINATOR: u8 = 0x03;

/// State that earlier instructions can change for later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerContext {
    pub terminator: u8,
}

impl LexerContext {
    pub fn new() -> Self {
        LexerContext {
            terminator: DEFAULT_TERMINATOR,
        }
    }

    /// Apply the side effect an instruction has on lexing.
    ///
    /// Only `DT` has one: the first byte of its argument becomes the label
    /// terminator. An empty `DT` restores ETX.
    pub fn observe(&mut self, instruction: &Instruction) {
        if instruction.command == DEFINE_TERMINATOR {
            self.terminator = instruction
                .argument_bytes
                .first()
                .copied()
                .unwrap_or(DEFAULT_TERMINATOR);
        }
    }
}

impl Default for LexerContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Lexer for HP-GL source
pub struct Lexer<'a> {
    input: &'a [u8],
    position: usize,
    context: LexerContext,
    in_label: bool,
    command: Vec<u8>,
    argument: Vec<u8>,
    source: Vec<u8>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source string.
    pub fn new(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Create a lexer over raw bytes (plot files are not always UTF-8).
    pub fn from_bytes(input: &'a [u8]) -> Self {
        Lexer {
            input,
            position: 0,
            context: LexerContext::new(),
            in_label: false,
            command: Vec::with_capacity(2),
            argument: Vec::new(),
            source: Vec::new(),
        }
    }

    /// The lexer context as left by the instructions consumed so far.
    pub fn context(&self) -> LexerContext {
        self.context
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Instruction> {
        self.tokenize_with(|_| {})
    }

    /// Tokenize the entire input, calling `on_instruction` for each
    /// instruction as soon as it is complete.
    ///
    /// The callback runs after the instruction's effect on the lexer context
    /// has been applied and before any further byte is scanned.
    pub fn tokenize_with<F>(&mut self, mut on_instruction: F) -> Vec<Instruction>
    where
        F: FnMut(&Instruction),
    {
        let mut instructions = Vec::new();

        while let Some(byte) = self.advance() {
            if byte != b'\n' {
                self.source.push(byte);
            }

            if self.in_label {
                if byte == self.context.terminator {
                    self.in_label = false;
                    instructions.push(self.finish(&mut on_instruction));
                } else {
                    self.argument.push(byte);
                }
                continue;
            }

            match byte {
                b' ' | b'\n' | b'\r' => {}
                b';' => {
                    // A bare `;` separates nothing and stays in the source
                    if !self.command.is_empty() {
                        instructions.push(self.finish(&mut on_instruction));
                    }
                }
                _ if self.command.len() < 2 => {
                    self.command.push(byte);
                    self.in_label = self.command.len() == 2
                        && is_label_command(&String::from_utf8_lossy(&self.command));
                }
                _ => self.argument.push(byte),
            }
        }

        if !self.command.is_empty() {
            instructions.push(self.finish(&mut on_instruction));
        } else if !self.source.is_empty() {
            // Trailing separators still belong on the wire
            if let Some(last) = instructions.last_mut() {
                last.source.append(&mut self.source);
            }
        }

        instructions
    }

    /// Emit the pending instruction and reset the accumulators.
    fn finish<F>(&mut self, on_instruction: &mut F) -> Instruction
    where
        F: FnMut(&Instruction),
    {
        let instruction = Instruction::from_bytes(
            &self.command,
            std::mem::take(&mut self.argument),
            std::mem::take(&mut self.source),
        );

        self.command.clear();
        self.in_label = false;

        self.context.observe(&instruction);
        on_instruction(&instruction);

        instruction
    }

    /// Advance to next byte
    fn advance(&mut self) -> Option<u8> {
        let byte = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }
}

/// Tokenize a whole HP-GL program starting from the power-on context.
pub fn tokenize(source: &str) -> Vec<Instruction> {
    Lexer::new(source).tokenize()
}

/// Render instructions back into a byte stream the lexer reads the same way.
///
/// Label arguments are closed with whatever terminator is in effect at that
/// point of the stream, so `DT` instructions are honoured while rendering.
pub fn render(instructions: &[Instruction]) -> Vec<u8> {
    let mut context = LexerContext::new();
    let mut out = Vec::new();

    for instruction in instructions {
        out.extend_from_slice(instruction.command.as_bytes());
        if instruction.is_label() {
            out.extend_from_slice(&instruction.argument_bytes);
            out.push(context.terminator);
        } else {
            if !instruction.argument.is_empty() {
                out.push(b' ');
                out.extend_from_slice(&instruction.argument_bytes);
            }
            out.push(b';');
        }
        context.observe(instruction);
    }

    out
}
