//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]** — application state, keyboard event loop, step counts and the
//!   serial option editor
//! - **[`panes`]** — stateless render functions for each visible pane
//!   (instructions, plotter state, serial line, status bar)
//! - **[`theme`]** — centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`StepController`] and call [`App::run`] to start the event loop. The UI
//! only ever sets targets on the controller; all device I/O happens on the
//! step loop's thread.
//!
//! [`StepController`]: crate::controller::StepController
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
