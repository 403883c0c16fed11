//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`instructions`]: The program, centered on the next instruction to send
//! - [`machine`]: Pen position, pen state and label terminator
//! - [`serial`]: Serial line settings and bytes written
//! - [`status`]: Status bar with keybindings, plus the error line
//!
//! Each pane module exports a primary `render_*` function that draws from
//! borrowed state and keeps nothing between frames.

pub mod instructions;
pub mod machine;
pub mod serial;
pub mod status;

// Re-export render functions for convenience
pub use instructions::render_instruction_pane;
pub use machine::render_machine_pane;
pub use serial::render_serial_line;
pub use status::{render_error_line, render_status_bar, StatusRenderData};
