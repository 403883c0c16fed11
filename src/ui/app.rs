//! Main TUI application state and logic

use crate::config::{SerialOption, SerialSettings};
use crate::controller::transport::SerialTransport;
use crate::controller::{ErrorReport, StepController, StepEvent};
use crossbeam_channel::Receiver;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tracing::{info, warn};

/// What keystrokes currently mean
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a new value for a serial option
    EditOption { option: SerialOption, input: String },
}

/// The main application state
pub struct App {
    /// Handle to the program being stepped
    pub controller: StepController,

    /// Notifications from the step loop
    pub events: Receiver<StepEvent>,

    pub settings: SerialSettings,
    pub mode: InputMode,

    /// Digits typed before `s`
    pub count_buffer: String,

    /// Latest error, replaced by the next one
    pub last_error: Option<ErrorReport>,

    /// Size of the last successful write
    pub bytes_written: Option<usize>,

    /// Whether a transport has been handed to the controller
    pub port_open: bool,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app around a controller and the settings it was started with
    pub fn new(
        controller: StepController,
        events: Receiver<StepEvent>,
        settings: SerialSettings,
    ) -> Self {
        App {
            controller,
            events,
            settings,
            mode: InputMode::Normal,
            count_buffer: String::new(),
            last_error: None,
            bytes_written: None,
            port_open: false,
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.drain_events();
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Poll with a timeout so step loop progress gets drawn
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply everything the step loop reported since the last frame
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                StepEvent::StateChanged => {}
                StepEvent::Written { bytes } => self.bytes_written = Some(bytes),
                StepEvent::Error(report) => self.last_error = Some(report),
            }
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let error_height = if self.last_error.is_some() { 1 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(error_height),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(size);

        let current = self.controller.current_index();
        let target = self.controller.target();

        super::panes::render_instruction_pane(
            frame,
            chunks[0],
            self.controller.instructions(),
            current,
            target,
        );

        super::panes::render_error_line(frame, chunks[1], self.last_error.as_ref());

        super::panes::render_machine_pane(frame, chunks[2], &self.controller.machine());

        super::panes::render_serial_line(
            frame,
            chunks[3],
            &self.settings,
            self.port_open,
            self.bytes_written,
        );

        let editing = match &self.mode {
            InputMode::Normal => None,
            InputMode::EditOption { option, input } => Some((*option, input.as_str())),
        };
        super::panes::render_status_bar(
            frame,
            chunks[4],
            &super::panes::StatusRenderData {
                message: &self.status_message,
                current,
                target,
                total: self.controller.len(),
                count_buffer: &self.count_buffer,
                editing,
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::EditOption { .. } => self.handle_edit_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Char('s') => {
                let count = if self.count_buffer.is_empty() {
                    1
                } else {
                    match self.count_buffer.parse::<usize>() {
                        Ok(count) => count,
                        Err(err) => {
                            self.report(format!("Invalid step count {}: {}", self.count_buffer, err));
                            self.count_buffer.clear();
                            return;
                        }
                    }
                };
                self.count_buffer.clear();
                self.controller.advance_by(count);
                self.status_message = format!("Queued {} step(s)", count);
            }
            KeyCode::Char('e') => {
                self.count_buffer.clear();
                self.controller.run_to_end();
                self.status_message = "Sending whole buffer".to_string();
            }
            KeyCode::Char('x') => {
                self.count_buffer.clear();
                self.controller.stop();
                self.status_message = "Stopped".to_string();
            }
            KeyCode::Char('o') => {
                self.count_buffer.clear();
                self.open_port();
            }
            KeyCode::Char(c @ '0'..='9') => self.count_buffer.push(c),
            KeyCode::Char(c) => {
                self.count_buffer.clear();
                if let Some(option) = SerialOption::from_key(c) {
                    self.mode = InputMode::EditOption {
                        option,
                        input: String::new(),
                    };
                }
            }
            _ => self.count_buffer.clear(),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let InputMode::EditOption { option, input } = &mut self.mode else {
            return;
        };

        match key.code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                let option = *option;
                let input = std::mem::take(input);
                self.mode = InputMode::Normal;
                self.apply_option(option, &input);
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            _ => {}
        }
    }

    /// Store a new option value and reopen the port with it
    fn apply_option(&mut self, option: SerialOption, value: &str) {
        if let Err(err) = self.settings.set_option(option, value) {
            self.report(err.to_string());
            return;
        }

        self.status_message = format!("{} set", option.name());
        if self.settings.port.is_some() {
            self.open_port();
        }
    }

    /// (Re)open the configured port with the current line settings and hand
    /// it to the step loop
    pub fn open_port(&mut self) {
        match SerialTransport::open(&self.settings) {
            Ok(transport) => {
                info!(port = transport.name(), settings = ?self.settings, "port opened");
                self.status_message = format!("Opened {}", transport.name());
                self.controller.set_transport(Some(Box::new(transport)));
                self.port_open = true;
            }
            Err(err) => {
                self.controller.set_transport(None);
                self.port_open = false;
                self.report(err.to_string());
            }
        }
    }

    fn report(&mut self, message: String) {
        warn!("{message}");
        self.last_error = Some(ErrorReport::new(message));
    }

    fn quit(&mut self) {
        self.controller.request_cancel();
        self.should_quit = true;
    }
}
