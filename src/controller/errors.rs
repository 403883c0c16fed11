//! Failures reported by the stepping loop
//!
//! None of these stop playback. Each one is logged, forwarded to the UI as the
//! latest error, and the loop moves on to the next instruction.

use crate::config::{Parity, StopBits};
use crate::interpreter::errors::InterpretError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("instruction {index}: {source}")]
    InvalidNumericArgument {
        index: usize,
        #[source]
        source: InterpretError,
    },

    #[error("instruction {index}: write to device failed: {source}")]
    TransportWriteFailed {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("instruction {index}: flush to device failed: {source}")]
    TransportFlushFailed {
        index: usize,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Index of the instruction that was being stepped.
    pub fn index(&self) -> usize {
        match self {
            StepError::InvalidNumericArgument { index, .. }
            | StepError::TransportWriteFailed { index, .. }
            | StepError::TransportFlushFailed { index, .. } => *index,
        }
    }
}

/// Failures opening the serial line. The port stays detached.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("No port set")]
    NoPort,

    #[error("{} parity is not supported by the serial driver", .0.name())]
    UnsupportedParity(Parity),

    #[error("{} stop bits are not supported by the serial driver", .0.name())]
    UnsupportedStopBits(StopBits),

    #[error("{0} data bits are not supported by the serial driver")]
    UnsupportedDataBits(u8),

    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
}
