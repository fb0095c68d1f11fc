use std::time::Duration;

// --- Play area (pixel units) ---
pub const PLAY_AREA_WIDTH: f64 = 800.0;
pub const PLAY_AREA_HEIGHT: f64 = 600.0;

// --- Timers ---
pub const SHIP_TICK_PERIOD: Duration = Duration::from_millis(8); // ~125 Hz
pub const SPAWN_PERIOD: Duration = Duration::from_millis(250);
pub const KEY_HOLD_TIMEOUT: Duration = Duration::from_millis(600); // Only used without key release events

// --- Ship ---
pub const SHIP_SIZE: f64 = 20.0;
pub const SHIP_SPAWN_HEIGHT: f64 = 21.0; // Vertical room reserved when placing the ship
pub const SHIP_X_OFFSET: f64 = 10.0;

// --- Asteroids ---
pub const ASTEROID_MIN_SIZE: u32 = 10;
pub const ASTEROID_MAX_SIZE: u32 = 40;
pub const ASTEROID_MIN_VELOCITY: u32 = 1;
pub const ASTEROID_MAX_VELOCITY: u32 = 4;
#[cfg(test)]
pub const ASTEROID_DEFAULT_SIZE: f64 = 10.0;
#[cfg(test)]
pub const ASTEROID_DEFAULT_VELOCITY: f64 = 1.0;
pub const ASTEROID_VISIBILITY_OFFSET: f64 = 5.0;

// --- Headless debug runs ---
pub const DEBUG_COLUMNS: u16 = 80;
pub const DEBUG_ROWS: u16 = 24;
pub const DEBUG_MAX_TICKS: u64 = 600;

pub const LOG_FILE: &str = "asteroid-dodge.log";
