use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    event::{self, Event, KeyEventKind},
    style::ResetColor,
};
use rand::rngs::StdRng;
use log::{error, info};

use crate::constants::*;
use crate::entities::Direction;
use crate::rendering::{GameGrid, OutputTarget};
use crate::terminal_io::{map_key, InputAction, ScriptedInput};
use crate::timers::PeriodicTimer;
use crate::world::{TickOutcome, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    GameOver,
    Quit,
    FrameLimit,
}

/// Virtual time of a headless frame: one ship period per frame.
fn virtual_elapsed(frame_count: u64) -> Duration {
    let period = u64::try_from(SHIP_TICK_PERIOD.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(period.saturating_mul(frame_count))
}

pub struct Game {
    terminal_width: u16,
    terminal_height: u16,
    stdout_target: OutputTarget,
    scripted_input: Option<ScriptedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
    release_events: bool,
    world: World,
    rng: StdRng,
    ship_timer: PeriodicTimer,
    spawn_timer: PeriodicTimer,
    input_attached: bool,
    redraw_requested: bool,
    last_steer: Option<Instant>,
    started_at: Instant,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        scripted_input: Option<ScriptedInput>,
        debug_mode_active: bool,
        max_frames: Option<u64>,
        release_events: bool,
        rng: StdRng,
    ) -> Self {
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            scripted_input,
            debug_mode_active,
            max_frames,
            release_events,
            world: World::new(PLAY_AREA_WIDTH, PLAY_AREA_HEIGHT),
            rng,
            ship_timer: PeriodicTimer::new(SHIP_TICK_PERIOD),
            spawn_timer: PeriodicTimer::new(SPAWN_PERIOD),
            input_attached: true,
            redraw_requested: true,
            last_steer: None,
            started_at: Instant::now(),
        }
    }

    pub fn run(&mut self) -> io::Result<SessionEnd> {
        if !self.debug_mode_active {
            self.show_title_screen()?;
        }

        // Bottom row is the status line.
        let grid_rows = self.terminal_height.saturating_sub(1).max(1);
        let mut game_grid = GameGrid::new(self.terminal_width, grid_rows, PLAY_AREA_WIDTH, PLAY_AREA_HEIGHT);

        self.started_at = Instant::now();
        self.ship_timer.start(self.started_at);
        self.spawn_timer.start(self.started_at);

        let mut frame_count: u64 = 0;
        let end = loop {
            if self.redraw_requested {
                self.render(&mut game_grid)?;
                self.redraw_requested = false;
            }

            if self.max_frames.is_some_and(|max| frame_count >= max) {
                info!("Frame limit of {} reached.", frame_count);
                break SessionEnd::FrameLimit;
            }

            if !self.handle_input(frame_count)? {
                info!("Quit requested.");
                break SessionEnd::Quit;
            }

            let now = self.now(frame_count);
            self.lapse_held_direction(now);

            if self.spawn_timer.fire(now) {
                self.world.spawn_asteroid(&mut self.rng);
            }

            if self.ship_timer.fire(now) && self.world.ship.is_some() && self.world.ship_direction() != Direction::None {
                let outcome = self.world.tick();
                self.redraw_requested = true;
                if outcome == TickOutcome::Collision {
                    self.stop();
                    info!("Collision after {} frames. Game over.", frame_count);
                    break SessionEnd::GameOver;
                }
            }

            frame_count += 1;
        };

        if end == SessionEnd::GameOver {
            self.show_game_over_screen()?;
        }
        Ok(end)
    }

    // Both timers stop and input is detached together, exactly once.
    fn stop(&mut self) {
        self.ship_timer.stop();
        self.spawn_timer.stop();
        self.input_attached = false;
    }

    fn now(&self, frame_count: u64) -> Instant {
        if self.debug_mode_active {
            self.started_at + virtual_elapsed(frame_count)
        } else {
            Instant::now()
        }
    }

    fn next_timeout(&self) -> Duration {
        let now = Instant::now();
        [self.ship_timer.time_until_due(now), self.spawn_timer.time_until_due(now)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(SHIP_TICK_PERIOD)
    }

    /// Dispatches pending input. Returns false when the player asked to quit.
    fn handle_input(&mut self, frame_count: u64) -> io::Result<bool> {
        if !self.input_attached {
            return Ok(true);
        }
        let mut pending: Vec<Event> = Vec::new();
        if self.debug_mode_active {
            if let Some(script) = &mut self.scripted_input {
                pending.extend(script.take(frame_count));
            }
        } else {
            let mut timeout = self.next_timeout();
            while event::poll(timeout).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                pending.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
                timeout = Duration::ZERO;
            }
        }

        for event in pending {
            let Event::Key(key_event) = event else {
                continue;
            };
            match map_key(&key_event) {
                InputAction::Quit => return Ok(false),
                InputAction::Steer(direction) => {
                    self.world.set_ship_direction(direction);
                    self.last_steer = match (direction, key_event.kind) {
                        (Direction::None, _) | (_, KeyEventKind::Release) => None,
                        _ => Some(self.now(frame_count)),
                    };
                }
            }
        }
        Ok(true)
    }

    // Terminals without release events only repeat presses while a key is
    // held; a direction with no recent press lapses back to None.
    fn lapse_held_direction(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        if let Some(last) = self.last_steer {
            if now.saturating_duration_since(last) >= KEY_HOLD_TIMEOUT {
                self.world.set_ship_direction(Direction::None);
                self.last_steer = None;
            }
        }
    }

    fn render(&mut self, game_grid: &mut GameGrid) -> io::Result<()> {
        self.world.prepare_frame(&mut self.rng);

        game_grid.clear();
        self.world.draw(game_grid);

        if let OutputTarget::Headless(screen) = &mut self.stdout_target {
            screen.clear();
        }
        game_grid.render(&mut self.stdout_target, 0)?;

        let status = format!(
            "Up/W/Keypad 8: up  Down/S/Keypad 2: down  Ctrl+C: quit  Asteroids: {}",
            self.world.asteroids.len()
        );
        let status_width = self.terminal_width as usize;
        self.stdout_target.move_cursor(0, game_grid.height)?;
        write!(self.stdout_target, "{:<width$.width$}", status, width = status_width)?;
        self.stdout_target.flush()?;

        if let OutputTarget::Headless(screen) = &self.stdout_target {
            screen.log_frame();
        }
        Ok(())
    }

    fn wait_for_key(&mut self) -> io::Result<()> {
        loop {
            if let Event::Key(key) = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }

    fn write_centered(&mut self, y: u16, text: &str) -> io::Result<()> {
        let x = (self.terminal_width / 2).saturating_sub(text.len() as u16 / 2);
        self.stdout_target.move_cursor(x, y)?;
        write!(self.stdout_target, "{}", text)
    }

    fn show_title_screen(&mut self) -> io::Result<()> {
        let title_art = [
            r"    _        _                 _     _   ___           _          ",
            r"   /_\  _ __| |_ ___ _ _ ___ _(_)__| | |   \ ___  __ _| |__ _ ___ ",
            r"  / _ \(_-<  _/ -_) '_/ _ \ | / _` | | |) / _ \/ _` / _` / -_)",
            r" /_/ \_\/__/\__\___|_| \___/_|_\__,_| |___/\___/\__,_\__, \___|",
            r"                                                     |___/     ",
        ];

        let game_grid_dummy = GameGrid::new(self.terminal_width, self.terminal_height, PLAY_AREA_WIDTH, PLAY_AREA_HEIGHT);
        game_grid_dummy.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;

        let title_start_y = (self.terminal_height / 2).saturating_sub(title_art.len() as u16 / 2 + 2);
        for (i, line) in title_art.iter().enumerate() {
            self.write_centered(title_start_y + i as u16, line)?;
        }
        self.write_centered(self.terminal_height.saturating_sub(5), "Dodge the asteroids. Press any key to start...")?;
        self.stdout_target.flush()?;
        info!("Title screen displayed. Waiting for key press.");

        self.wait_for_key()?;
        game_grid_dummy.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
        self.stdout_target.flush()?;
        Ok(())
    }

    fn show_game_over_screen(&mut self) -> io::Result<()> {
        self.stdout_target.apply(ResetColor)?;
        let mid = self.terminal_height / 2;
        self.write_centered(mid.saturating_sub(1), "           ")?;
        self.write_centered(mid, " Game Over ")?;
        self.write_centered(mid + 1, "           ")?;
        self.stdout_target.flush()?;

        if let OutputTarget::Headless(screen) = &self.stdout_target {
            screen.log_frame();
            return Ok(());
        }
        self.write_centered(mid + 3, "Press any key to exit...")?;
        self.stdout_target.flush()?;
        self.wait_for_key()
    }
}
