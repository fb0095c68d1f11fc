mod constants;
mod entities;
mod error;
mod game;
mod geometry;
mod rendering;
mod terminal_io;
mod timers;
mod types;
mod world;

use std::env;
use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use log::{error, info};

use crate::constants::*;
use crate::error::GameResult;
use crate::game::{Game, SessionEnd};
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::terminal_io::ScriptedInput;

#[derive(Debug, PartialEq)]
struct Options {
    debug: bool,
    columns: u16,
    rows: u16,
    max_frames: Option<u64>,
    seed: Option<u64>,
}

// Usage: asteroid-dodge [--seed N] [--debug [COLS ROWS [MAX_FRAMES]]]
fn parse_args(args: &[String]) -> Options {
    let mut args: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();

    let mut seed = None;
    if let Some(i) = args.iter().position(|a| *a == "--seed") {
        seed = args.get(i + 1).and_then(|s| s.parse::<u64>().ok());
        args.remove(i);
        if i < args.len() {
            args.remove(i);
        }
    }

    let debug = args.first() == Some(&"--debug");
    let mut options = Options {
        debug,
        columns: DEBUG_COLUMNS,
        rows: DEBUG_ROWS,
        max_frames: None,
        seed,
    };
    if debug {
        if args.len() >= 3 {
            options.columns = args[1].parse::<u16>().unwrap_or(DEBUG_COLUMNS);
            options.rows = args[2].parse::<u16>().unwrap_or(DEBUG_ROWS);
        }
        options.max_frames = Some(
            args.get(3)
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEBUG_MAX_TICKS),
        );
    }
    options
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Undoes the interactive terminal setup when dropped, so a failed setup
/// step or game loop still leaves the shell usable.
struct TerminalGuard<W: Write> {
    out: W,
    keyboard_enhanced: bool,
}

impl<W: Write> TerminalGuard<W> {
    fn new(out: W) -> Self {
        TerminalGuard { out, keyboard_enhanced: false }
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(&mut self.out, self.keyboard_enhanced) {
            error!("Failed to restore terminal: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        }
    }
}

fn restore_terminal(out: &mut impl Write, keyboard_enhanced: bool) -> io::Result<()> {
    if keyboard_enhanced {
        execute!(out, PopKeyboardEnhancementFlags)?;
    }
    execute!(out, Show, LeaveAlternateScreen)?;
    out.flush()
}

fn run_interactive(rng: StdRng) -> io::Result<SessionEnd> {
    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let mut guard = TerminalGuard::new(io::stdout());

    let (terminal_width, terminal_height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", terminal_width, terminal_height);

    execute!(guard.out, EnterAlternateScreen, Hide)?;

    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            guard.out,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES,
            )
        )?;
        guard.keyboard_enhanced = true;
    }
    info!("Key release events available: {}", release_events);

    let mut game = Game::new(
        terminal_width,
        terminal_height,
        OutputTarget::Terminal(io::stdout()),
        None,
        false,
        None,
        release_events,
        rng,
    );
    game.run().map_err(|e| { error!("Game loop failed: {}", e); e })
}

fn main() -> GameResult<()> {
    if let Err(e) = simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info) {
        eprintln!("Could not open {}: {}", LOG_FILE, e);
    }
    info!("Starting asteroid-dodge.");

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);
    let rng = make_rng(options.seed);

    let end = if options.debug {
        info!("Debug mode enabled at {}x{}.", options.columns, options.rows);
        let mut game = Game::new(
            options.columns,
            options.rows,
            OutputTarget::Headless(ScreenBuffer::new(options.columns, options.rows)),
            Some(ScriptedInput::default_script()),
            true,
            options.max_frames,
            true,
            rng,
        );
        game.run()?
    } else {
        run_interactive(rng)?
    };
    info!("Session ended: {:?}.", end);
    Ok(())
}
