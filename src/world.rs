//! Game state shared by the ship tick and the spawn timer.
//!
//! Everything here is plain data plus a random source, so the whole game can
//! be driven from tests without a terminal.

use log::{debug, error, info};
use rand::Rng;

use crate::constants::*;
use crate::entities::{Asteroid, Body, BodyMut, Direction, Ship};
use crate::rendering::Surface;
use crate::types::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Collision,
}

pub struct World {
    pub width: f64,
    pub height: f64,
    pub ship: Option<Ship>,
    pub asteroids: Vec<Asteroid>,
}

impl World {
    pub fn new(width: f64, height: f64) -> Self {
        World { width, height, ship: None, asteroids: Vec::new() }
    }

    /// Lazy bootstrap run before every frame: creates the ship if it is
    /// missing and spawns an asteroid whenever the field is empty.
    pub fn prepare_frame(&mut self, rng: &mut impl Rng) {
        if self.ship.is_none() {
            self.create_ship(rng);
        }
        if self.asteroids.is_empty() {
            self.spawn_asteroid(rng);
        }
    }

    fn create_ship(&mut self, rng: &mut impl Rng) {
        let h = (self.height - SHIP_SPAWN_HEIGHT).max(1.0);
        let y = rng.gen_range(0..h as u32) as f64;
        let mut ship = Ship::new(SHIP_X_OFFSET, y);
        ship.set_movement_bounds(Rect::new(0.0, 0.0, self.width, self.height));
        info!("Ship created at {:?}, bounds {:?}.", ship.position(), ship.movement_bounds());
        self.ship = Some(ship);
    }

    pub fn spawn_asteroid(&mut self, rng: &mut impl Rng) {
        let max_size = ASTEROID_MAX_SIZE as f64;
        let x = self.width - max_size;
        let h = (self.height - max_size).max(1.0);
        let y = rng.gen_range(0..h as u32) as f64;
        let width = rng.gen_range(ASTEROID_MIN_SIZE..ASTEROID_MAX_SIZE) as f64;
        let height = rng.gen_range(ASTEROID_MIN_SIZE..ASTEROID_MAX_SIZE) as f64;
        let velocity = rng.gen_range(ASTEROID_MIN_VELOCITY..ASTEROID_MAX_VELOCITY) as f64;
        let asteroid = Asteroid::new(x, y, width, height, velocity);
        debug!(
            "Spawning asteroid at {:?}, size {}x{}, velocity {}.",
            asteroid.position(),
            asteroid.width(),
            asteroid.height(),
            asteroid.velocity()
        );
        self.asteroids.push(asteroid);
    }

    pub fn set_ship_direction(&mut self, direction: Direction) {
        if let Some(ship) = self.ship.as_mut() {
            ship.set_direction(direction);
        }
    }

    pub fn ship_direction(&self) -> Direction {
        self.ship.as_ref().map_or(Direction::None, Ship::direction)
    }

    /// Every body in the field, ship first.
    pub fn bodies(&self) -> impl Iterator<Item = Body<'_>> {
        self.ship
            .iter()
            .map(Body::Ship)
            .chain(self.asteroids.iter().map(Body::Asteroid))
    }

    fn bodies_mut(&mut self) -> impl Iterator<Item = BodyMut<'_>> {
        self.ship
            .iter_mut()
            .map(BodyMut::Ship)
            .chain(self.asteroids.iter_mut().map(BodyMut::Asteroid))
    }

    /// One ship tick: ship motion, asteroid motion and pruning, then the
    /// collision check, in that order.
    pub fn tick(&mut self) -> TickOutcome {
        let before = self.asteroids.len();
        // An asteroid is never moved once invisible.
        self.asteroids.retain(Asteroid::is_visible);
        for mut body in self.bodies_mut() {
            body.move_body();
        }
        self.asteroids.retain(Asteroid::is_visible);
        let removed = before - self.asteroids.len();
        if removed > 0 {
            debug!("Pruned {} asteroid(s), {} remaining.", removed, self.asteroids.len());
        }

        if self.check_collisions() {
            TickOutcome::Collision
        } else {
            TickOutcome::Continue
        }
    }

    pub fn check_collisions(&self) -> bool {
        let Some(ship) = self.ship.as_ref() else {
            return false;
        };
        let ship = Body::Ship(ship);
        self.asteroids.iter().map(Body::Asteroid).any(|body| match ship.intersects(&body) {
            Ok(true) => {
                debug!(
                    "Collision: {} {:?} with {} {:?}.",
                    ship.kind(),
                    ship.outline().bounds(),
                    body.kind(),
                    body.outline().bounds()
                );
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!("Collision check failed: {}", e);
                false
            }
        })
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for body in self.bodies() {
            body.draw(surface);
        }
    }
}
