//! # Introduction
//!
//! hpstep feeds an HP-GL plot file to a plotter one instruction at a time,
//! showing where the pen should be after every step. It is meant for bringing
//! up old plotters and for finding the instruction that makes one misbehave.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Instructions → StepController ⇄ TUI
//!                                      ↓
//!                           Interpreter + serial device
//! ```
//!
//! 1. [`parser`] — splits the file into instructions in one pass, following
//!    `DT` changes to the label terminator as it goes.
//! 2. [`interpreter`] — tracks pen position, pen state and the terminator.
//! 3. [`controller`] — background step loop that interprets and transmits
//!    each instruction exactly once, in order, up to the operator's target.
//! 4. [`config`] — serial line settings from defaults, a TOML file and flags.
//! 5. [`ui`] — ratatui-based TUI; not part of the stable library API.

pub mod config;
pub mod controller;
pub mod interpreter;
pub mod parser;
pub mod ui;
