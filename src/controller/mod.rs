//! Stepped transmission of instructions to a plotter
//!
//! A [`StepController`] owns the tokenized program together with two indices:
//! `current`, the number of instructions already interpreted and sent, and
//! `target`, where the operator wants playback to stop. A background loop
//! ([`StepController::run`]) advances `current` towards `target` one step at a
//! time. A step interprets the instruction, writes its source bytes to the
//! transport (if one is attached) and then bumps `current`, all while holding
//! the step lock, so the device sees instructions strictly in order and each
//! one exactly once.
//!
//! # Threading
//!
//! - `current` is an atomic and can be read from the UI at any time.
//! - `target`, cancellation and transport hand-over live behind one mutex
//!   paired with a condition variable; the loop sleeps on it while idle.
//! - The UI never takes the step lock, so a slow device cannot stall it.
//!   The interpreter state it displays is a copy published after each step.

pub mod errors;
pub mod transport;

use crate::interpreter::engine::Machine;
use crate::parser::instruction::Instruction;
use chrono::{DateTime, Local};
use crossbeam_channel::Sender;
use errors::StepError;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use transport::Transport;

/// A failure surfaced to the operator
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub at: DateTime<Local>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorReport {
            message: message.into(),
            at: Local::now(),
        }
    }
}

/// Notifications sent from the step loop to the UI
#[derive(Debug, Clone)]
pub enum StepEvent {
    /// A step completed; redraw.
    StateChanged,
    /// An instruction was written and flushed to the transport.
    Written { bytes: usize },
    /// A step hit an error. Playback continues.
    Error(ErrorReport),
}

type TransportSlot = Option<Box<dyn Transport>>;

/// Operator-owned half of the progress state
struct Control {
    target: usize,
    cancelled: bool,
    /// A transport waiting to be installed by the step loop
    pending_transport: Option<TransportSlot>,
}

/// Loop-owned half, only touched inside a step
struct Stepper {
    machine: Machine,
    transport: TransportSlot,
}

struct Shared {
    instructions: Arc<[Instruction]>,
    current: AtomicUsize,
    control: Mutex<Control>,
    wake: Condvar,
    stepper: Mutex<Stepper>,
    published: Mutex<Machine>,
    events: Sender<StepEvent>,
}

/// Handle to a program being stepped. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct StepController {
    shared: Arc<Shared>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StepController {
    /// Create a controller with no transport attached (dry run).
    pub fn new(instructions: Vec<Instruction>, events: Sender<StepEvent>) -> Self {
        StepController {
            shared: Arc::new(Shared {
                instructions: instructions.into(),
                current: AtomicUsize::new(0),
                control: Mutex::new(Control {
                    target: 0,
                    cancelled: false,
                    pending_transport: None,
                }),
                wake: Condvar::new(),
                stepper: Mutex::new(Stepper {
                    machine: Machine::new(),
                    transport: None,
                }),
                published: Mutex::new(Machine::new()),
                events,
            }),
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.shared.instructions
    }

    pub fn len(&self) -> usize {
        self.shared.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.instructions.is_empty()
    }

    /// Number of fully completed steps.
    pub fn current_index(&self) -> usize {
        self.shared.current.load(Ordering::Acquire)
    }

    pub fn target(&self) -> usize {
        lock(&self.shared.control).target
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.shared.control).cancelled
    }

    /// Interpreter state as of the last completed step.
    pub fn machine(&self) -> Machine {
        *lock(&self.shared.published)
    }

    /// Set where playback should stop. Values past the end mean "run to
    /// completion"; values at or below `current` pause playback.
    pub fn set_target(&self, index: usize) {
        self.update_control(|control| control.target = index);
        debug!(target_index = index, "target set");
    }

    /// Queue `count` more steps after whatever is already queued.
    pub fn advance_by(&self, count: usize) {
        let current = self.current_index();
        self.update_control(|control| {
            control.target = control.target.max(current).saturating_add(count);
        });
    }

    /// Queue every remaining instruction.
    pub fn run_to_end(&self) {
        self.set_target(self.len());
    }

    /// Stop after the step in flight, if any.
    pub fn stop(&self) {
        self.set_target(self.current_index());
    }

    /// Hand a new transport (or `None` to detach) to the step loop.
    ///
    /// The swap happens inside the step lock, between two steps.
    pub fn set_transport(&self, transport: Option<Box<dyn Transport>>) {
        self.update_control(|control| control.pending_transport = Some(transport));
    }

    /// Stop the loop. A step already in flight completes; no new one starts.
    pub fn request_cancel(&self) {
        self.update_control(|control| control.cancelled = true);
        info!("step loop cancellation requested");
    }

    fn update_control(&self, update: impl FnOnce(&mut Control)) {
        update(&mut lock(&self.shared.control));
        self.shared.wake.notify_all();
    }

    /// Perform one step if there is work to do. Returns whether a step ran.
    pub fn try_step(&self) -> bool {
        let mut stepper = lock(&self.shared.stepper);
        let index = self.current_index();

        let (target, cancelled) = {
            let mut control = lock(&self.shared.control);
            if let Some(transport) = control.pending_transport.take() {
                info!(attached = transport.is_some(), "transport replaced");
                stepper.transport = transport;
            }
            (control.target, control.cancelled)
        };

        if cancelled || index >= target.min(self.len()) {
            return false;
        }

        let instruction = &self.shared.instructions[index];

        if let Err(source) = stepper.machine.run_instruction(instruction) {
            self.report(StepError::InvalidNumericArgument { index, source });
        }

        if let Some(transport) = stepper.transport.as_mut() {
            match transport.send(&instruction.source) {
                Ok(bytes) => match transport.sync() {
                    Ok(()) => {
                        let _ = self.shared.events.send(StepEvent::Written { bytes });
                    }
                    Err(source) => self.report(StepError::TransportFlushFailed { index, source }),
                },
                Err(source) => self.report(StepError::TransportWriteFailed { index, source }),
            }
        }

        *lock(&self.shared.published) = stepper.machine;
        self.shared.current.store(index + 1, Ordering::Release);
        drop(stepper);

        debug!(index, command = %instruction.command, "stepped");
        let _ = self.shared.events.send(StepEvent::StateChanged);
        true
    }

    /// Run the step loop on the calling thread until cancelled.
    pub fn run(&self) {
        info!(instructions = self.len(), "step loop started");
        while self.wait_for_work() {
            self.try_step();
        }
        info!(current = self.current_index(), "step loop stopped");
    }

    /// Run the step loop on a dedicated thread.
    pub fn spawn(&self) -> io::Result<JoinHandle<()>> {
        let controller = self.clone();
        thread::Builder::new()
            .name("step-loop".to_string())
            .spawn(move || controller.run())
    }

    /// Sleep until there is a step to take or a transport to install.
    /// Returns `false` once cancelled.
    fn wait_for_work(&self) -> bool {
        let mut control = lock(&self.shared.control);
        loop {
            if control.cancelled {
                return false;
            }
            let pending_step = self.current_index() < control.target.min(self.len());
            if pending_step || control.pending_transport.is_some() {
                return true;
            }
            control = self
                .shared
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn report(&self, error: StepError) {
        warn!(index = error.index(), "{error}");
        let _ = self
            .shared
            .events
            .send(StepEvent::Error(ErrorReport::new(error.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crossbeam_channel::{unbounded, Receiver};
    use std::io::Write;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Vec<u8>>>>);

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken {
        fail_write: bool,
    }

    impl Write for Broken {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_write {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "no handshake"))
        }
    }

    fn controller(source: &str) -> (StepController, Receiver<StepEvent>) {
        let (tx, rx) = unbounded();
        (StepController::new(tokenize(source), tx), rx)
    }

    fn errors(rx: &Receiver<StepEvent>) -> Vec<String> {
        rx.try_iter()
            .filter_map(|event| match event {
                StepEvent::Error(report) => Some(report.message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_no_step_without_target() {
        let (controller, rx) = controller("PA1,1;PD;");
        assert!(!controller.try_step());
        assert_eq!(controller.current_index(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dry_run_interprets() {
        let (controller, rx) = controller("PA10,20;PR5,-5;PD;");
        controller.run_to_end();
        while controller.try_step() {}

        assert_eq!(controller.current_index(), 3);
        let machine = controller.machine();
        assert_eq!((machine.plotter.x, machine.plotter.y), (15, 15));
        assert!(machine.plotter.pen_down);
        let changes = rx
            .try_iter()
            .filter(|event| matches!(event, StepEvent::StateChanged))
            .count();
        assert_eq!(changes, 3);
    }

    #[test]
    fn test_target_past_end_stops_at_len() {
        let (controller, _rx) = controller("PU;PD;");
        controller.set_target(100);
        assert!(controller.try_step());
        assert!(controller.try_step());
        assert!(!controller.try_step());
        assert_eq!(controller.current_index(), 2);
    }

    #[test]
    fn test_transport_receives_source_bytes() {
        let (controller, rx) = controller("IN;\nPA 1,2;LBhi\u{3}");
        let recorder = Recorder::default();
        controller.set_transport(Some(Box::new(recorder.clone())));
        controller.run_to_end();
        while controller.try_step() {}

        let written = recorder.0.lock().unwrap().clone();
        assert_eq!(written, vec![b"IN;".to_vec(), b"PA 1,2;".to_vec(), b"LBhi\x03".to_vec()]);
        let bytes: usize = rx
            .try_iter()
            .filter_map(|event| match event {
                StepEvent::Written { bytes } => Some(bytes),
                _ => None,
            })
            .sum();
        assert_eq!(bytes, 3 + 7 + 5);
    }

    #[test]
    fn test_interpret_error_still_transmits() {
        let (controller, rx) = controller("PA1,2;PAx,y;PD;");
        let recorder = Recorder::default();
        controller.set_transport(Some(Box::new(recorder.clone())));
        controller.run_to_end();
        while controller.try_step() {}

        assert_eq!(controller.current_index(), 3);
        assert_eq!(recorder.0.lock().unwrap().len(), 3);
        let machine = controller.machine();
        assert_eq!((machine.plotter.x, machine.plotter.y), (1, 2));
        assert!(machine.plotter.pen_down);

        let errors = errors(&rx);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("instruction 1:"));
    }

    #[test]
    fn test_transport_errors_are_not_fatal() {
        let (controller, rx) = controller("PU;PD;");
        controller.set_transport(Some(Box::new(Broken { fail_write: true })));
        controller.set_target(1);
        assert!(controller.try_step());

        controller.set_transport(Some(Box::new(Broken { fail_write: false })));
        controller.set_target(2);
        assert!(controller.try_step());

        let errors = errors(&rx);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("write to device failed"));
        assert!(errors[1].contains("flush to device failed"));
        assert_eq!(controller.current_index(), 2);
    }

    #[test]
    fn test_advance_by_queues_after_target() {
        let (controller, _rx) = controller("PU;PU;PU;PU;PU;");
        controller.advance_by(2);
        controller.advance_by(1);
        assert_eq!(controller.target(), 3);

        while controller.try_step() {}
        controller.set_target(0);
        controller.advance_by(1);
        assert_eq!(controller.target(), 4);
    }

    #[test]
    fn test_stop_pins_target_to_current() {
        let (controller, _rx) = controller("PU;PD;PU;");
        controller.run_to_end();
        assert!(controller.try_step());
        controller.stop();
        assert!(!controller.try_step());
        assert_eq!(controller.target(), 1);
    }

    #[test]
    fn test_cancel_blocks_further_steps() {
        let (controller, _rx) = controller("PU;PD;");
        controller.run_to_end();
        controller.request_cancel();
        assert!(controller.is_cancelled());
        assert!(!controller.try_step());
        assert_eq!(controller.current_index(), 0);
    }

    #[test]
    fn test_spawned_loop_exits_on_cancel() {
        let (controller, rx) = controller("PU;PD;");
        let handle = controller.spawn().unwrap();
        controller.run_to_end();
        for _ in 0..2 {
            loop {
                if let StepEvent::StateChanged = rx.recv().unwrap() {
                    break;
                }
            }
        }
        controller.request_cancel();
        handle.join().unwrap();
        assert_eq!(controller.current_index(), 2);
    }
}
