//! HP-GL interpreter
//!
//! This module tracks what the plotter should be doing after each instruction:
//! - [`engine`]: Pen position and pen state, plus the [`Machine`](engine::Machine)
//!   that pairs them with the lexer context
//! - [`errors`]: Interpretation error types
//!
//! # Execution Model
//!
//! Instructions are applied one at a time. A failed instruction leaves the
//! state exactly as it was. Commands the interpreter does not model are
//! accepted and ignored.

pub mod engine;
pub mod errors;

pub use engine::{Machine, PlotterState};
pub use errors::InterpretError;
