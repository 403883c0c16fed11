// hpstep: Single-step HP-GL plot files to a serial plotter

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hpstep::config::{Config, Parity, StopBits};
use hpstep::controller::StepController;
use hpstep::parser::Lexer;
use hpstep::ui::App;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// HP-GL file to step through
    file: PathBuf,

    /// Serial device to send instructions to (omit for a dry run)
    #[arg(short, long)]
    port: Option<PathBuf>,

    #[arg(short, long)]
    baud: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(5..=8))]
    data_bits: Option<u8>,

    /// no, odd, even, mark or space
    #[arg(long)]
    parity: Option<Parity>,

    /// 1, 1.5 or 2
    #[arg(long)]
    stop_bits: Option<StopBits>,

    /// TOML file with a [serial] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs here; the terminal belongs to the UI
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut settings = Config::load(args.config.as_deref())?.serial;
    if let Some(port) = args.port {
        settings.port = Some(port);
    }
    if let Some(baud) = args.baud {
        settings.baud_rate = baud;
    }
    if let Some(data_bits) = args.data_bits {
        settings.data_bits = data_bits;
    }
    if let Some(parity) = args.parity {
        settings.parity = parity;
    }
    if let Some(stop_bits) = args.stop_bits {
        settings.stop_bits = stop_bits;
    }

    // Read source bytes; plot files are not always UTF-8
    let source =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    eprintln!("Parsing {}...", args.file.display());
    let instructions = Lexer::from_bytes(&source).tokenize();
    eprintln!("Parsed {} instructions.", instructions.len());
    info!(file = %args.file.display(), instructions = instructions.len(), "program loaded");

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let controller = StepController::new(instructions, events_tx);
    let step_loop = controller.spawn().context("cannot start step loop")?;

    let mut app = App::new(controller.clone(), events_rx, settings);
    if app.settings.port.is_some() {
        app.open_port();
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.request_cancel();
    step_loop
        .join()
        .map_err(|_| anyhow!("step loop panicked"))?;
    info!(sent = controller.current_index(), "exiting");

    res.context("terminal UI failed")
}
