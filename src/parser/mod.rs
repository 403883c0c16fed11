//! HP-GL source parser
//!
//! This module turns a plot file into an ordered list of instructions:
//! - [`lexer`]: Tokenization (source bytes → instructions), including the
//!   label terminator that `DT` redefines mid-stream
//! - [`instruction`]: The [`Instruction`](instruction::Instruction) type
//!
//! # Error Policy
//!
//! Lexing never fails. Malformed fragments come out as best-effort
//! instructions and are left for the interpreter (or the plotter) to judge.

pub mod instruction;
pub mod lexer;

pub use instruction::Instruction;
pub use lexer::{tokenize, Lexer, LexerContext};
