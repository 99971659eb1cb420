//! Terminal console (default binary).
//!
//! The terminal plays the front panel: the LCD is drawn inside a bezel, the
//! arrow keys turn the knob and Enter pushes it. Controllers are either
//! simulated in-process or reached through a bus gateway (`CONSOLE_GATEWAY`).

use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tetris_console::adapter::{ControllerLink, SimulatedBus, TcpLink};
use tetris_console::core::SimpleRng;
use tetris_console::engine::{Clock, Console, ConsoleConfig, LinkConfig, ResultJournal, SystemClock};
use tetris_console::input::{should_quit, EncoderState, InputSource, KeyboardEncoder};
use tetris_console::term::{
    BellFeedback, BuzzerHandle, CharGrid, ConsoleView, FrameBuffer, RedrawTracker, StatusLine,
    TerminalRenderer, Viewport,
};

const LOOP_MS: u64 = 10;
const INPUT_POLL_MS: u64 = 10;

fn main() -> Result<()> {
    let config = ConsoleConfig::from_env()?;
    init_logging(&config)?;

    let (link, link_label): (Box<dyn ControllerLink>, String) = match config.link {
        LinkConfig::Simulated => {
            let seed = config.seed.unwrap_or_else(|| SimpleRng::from_time().next_u32());
            let bus = SimulatedBus::randomized(seed, 50, 600);
            (Box::new(bus) as Box<dyn ControllerLink>, "sim".to_string())
        }
        LinkConfig::Gateway(addr) => {
            let link = TcpLink::connect(addr, Duration::from_millis(config.io_timeout_ms))
                .with_context(|| format!("connecting to bus gateway {}", addr))?;
            (Box::new(link) as Box<dyn ControllerLink>, addr.to_string())
        }
    };
    info!(link = %link_label, "console starting");

    let bell = BellFeedback::new(true);
    let buzzer = bell.handle();
    let mut console = Console::new(&config, link, CharGrid::new(), SystemClock::new())
        .with_feedback(bell);
    if let Some(path) = &config.result_log_path {
        let journal =
            ResultJournal::open(path).with_context(|| format!("opening result log {}", path))?;
        console = console.with_journal(journal);
    }

    let encoder = Arc::new(EncoderState::new());
    let quit = Arc::new(AtomicBool::new(false));
    let resized = Arc::new(AtomicBool::new(false));
    let input_thread = spawn_input_thread(
        Arc::clone(&encoder),
        Arc::clone(&quit),
        Arc::clone(&resized),
    );

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(
        &mut term,
        &mut console,
        &link_label,
        InputSource::new(encoder),
        &quit,
        &resized,
        &buzzer,
    );

    // Always try to restore terminal state.
    quit.store(true, Ordering::Relaxed);
    let _ = term.exit();
    let _ = input_thread.join();
    result
}

fn init_logging(config: &ConsoleConfig) -> Result<()> {
    // The terminal is the LCD; logs only go to a file.
    let Some(path) = &config.log_path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Stand-in for the encoder interrupt: key events only touch the atomics.
fn spawn_input_thread(
    encoder: Arc<EncoderState>,
    quit: Arc<AtomicBool>,
    resized: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut keyboard = KeyboardEncoder::new(encoder);
        while !quit.load(Ordering::Relaxed) {
            keyboard.update();
            match event::poll(Duration::from_millis(INPUT_POLL_MS)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if should_quit(key) => quit.store(true, Ordering::Relaxed),
                    Ok(Event::Key(key)) => keyboard.handle_key(key),
                    Ok(Event::Resize(_, _)) => resized.store(true, Ordering::Relaxed),
                    Ok(_) => {}
                    Err(_) => quit.store(true, Ordering::Relaxed),
                },
                Ok(false) => {}
                Err(_) => quit.store(true, Ordering::Relaxed),
            }
        }
    })
}

fn run(
    term: &mut TerminalRenderer,
    console: &mut Console<Box<dyn ControllerLink>, CharGrid, SystemClock>,
    link_label: &str,
    mut input: InputSource,
    quit: &AtomicBool,
    resized: &AtomicBool,
    buzzer: &BuzzerHandle,
) -> Result<()> {
    let view = ConsoleView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut redraw = RedrawTracker::default();
    console.boot();

    while !quit.load(Ordering::Relaxed) {
        let sample = input.sample(console.clock().now_ms());
        if let Some(report) = console.step(sample) {
            info!(winner = %report.winner, "round finished");
        }

        if resized.swap(false, Ordering::Relaxed) {
            term.invalidate();
            redraw.reset();
        }
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let menu = console.menu();
        let status = StatusLine {
            link: link_label.to_string(),
            menu: menu.state().as_str(),
            phase: menu.coordinator().phase().as_str(),
            faulted: menu.coordinator().faults().len(),
        };
        let buzzing = buzzer.is_active();
        let viewport = Viewport::new(w, h);
        if redraw.changed(console.display(), &status, buzzing, viewport) {
            view.render_into(console.display(), &status, buzzing, viewport, &mut fb);
            term.draw_swap(&mut fb)?;
        }

        thread::sleep(Duration::from_millis(LOOP_MS));
    }
    Ok(())
}
