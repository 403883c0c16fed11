//! Error types for the HP-GL interpreter
//!
//! Interpretation errors are never fatal: the stepping loop reports them and
//! still sends the instruction to the plotter, which has the final word on
//! what a malformed command means.

use thiserror::Error;

/// Errors raised while applying one instruction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// A coordinate list was not two base-10 integers separated by a comma
    #[error("invalid numeric argument for {command}: {argument:?}")]
    InvalidNumericArgument { command: String, argument: String },
}
