use crossterm::style::Color;

use crate::constants::*;
use crate::error::{GameError, GameResult};
use crate::geometry::{polygon_overlaps_ellipse, Ellipse, Outline, Polygon};
use crate::rendering::Surface;
use crate::types::{Rect, Vector2D};

const SHIP_FILL: Color = Color::Green;
const SHIP_BORDER: Color = Color::Black;
const ASTEROID_FILL: Color = Color::DarkGrey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    Up,
    Down,
    #[default]
    None,
}

impl Direction {
    pub fn dy(self) -> f64 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
            Direction::None => 0.0,
        }
    }
}

// --- Ship ---
pub struct Ship {
    shape: Polygon,
    direction: Direction,
    bounds: Option<Rect>,
}

impl Ship {
    /// Places the ship with the top-left of its outline at (x, y).
    pub fn new(x: f64, y: f64) -> Self {
        let mut shape = Polygon::new(vec![
            Vector2D::new(0.0, 0.0),              // top left
            Vector2D::new(0.0, SHIP_SIZE),        // bottom left
            Vector2D::new(SHIP_SIZE, SHIP_SIZE / 2.0), // nose
        ]);
        shape.translate(x, y);
        Ship { shape, direction: Direction::None, bounds: None }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn movement_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_movement_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn position(&self) -> Vector2D {
        let b = self.shape.bounds();
        Vector2D::new(b.x, b.y)
    }

    pub fn outline(&self) -> &Polygon {
        &self.shape
    }

    /// One step in the current direction. A step that takes the outline
    /// out of the movement bounds is undone.
    pub fn move_ship(&mut self) {
        let dy = self.direction.dy();
        if dy == 0.0 {
            return;
        }
        self.shape.translate(0.0, dy);
        if let Some(bounds) = self.bounds {
            if !bounds.contains_rect(&self.shape.bounds()) {
                self.shape.translate(0.0, -dy);
            }
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        surface.stroke_polygon(&self.shape, SHIP_BORDER);
        surface.fill_polygon(&self.shape, SHIP_FILL);
    }

    pub fn intersects(&self, asteroid: &Asteroid) -> bool {
        polygon_overlaps_ellipse(&self.shape, &asteroid.shape)
    }
}

// --- Asteroid ---
pub struct Asteroid {
    shape: Ellipse,
    velocity: f64,
}

impl Asteroid {
    pub fn new(x: f64, y: f64, width: f64, height: f64, velocity: f64) -> Self {
        Asteroid { shape: Ellipse::new(x, y, width, height), velocity }
    }

    #[cfg(test)]
    pub fn with_defaults(x: f64, y: f64) -> Self {
        Asteroid::new(x, y, ASTEROID_DEFAULT_SIZE, ASTEROID_DEFAULT_SIZE, ASTEROID_DEFAULT_VELOCITY)
    }

    pub fn position(&self) -> Vector2D {
        Vector2D::new(self.shape.frame.x, self.shape.frame.y)
    }

    pub fn width(&self) -> f64 {
        self.shape.frame.width
    }

    pub fn height(&self) -> f64 {
        self.shape.frame.height
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn outline(&self) -> &Ellipse {
        &self.shape
    }

    pub fn move_asteroid(&mut self) {
        self.shape.translate(-self.velocity, 0.0);
    }

    pub fn is_visible(&self) -> bool {
        self.shape.frame.x >= ASTEROID_VISIBILITY_OFFSET
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        surface.fill_ellipse(&self.shape, ASTEROID_FILL);
    }

    pub fn intersects(&self, ship: &Ship) -> bool {
        polygon_overlaps_ellipse(&ship.shape, &self.shape)
    }
}

/// Borrowed view of one body in the field, for code that handles ships and
/// asteroids alike.
#[derive(Clone, Copy)]
pub enum Body<'a> {
    Ship(&'a Ship),
    Asteroid(&'a Asteroid),
}

impl Body<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Ship(_) => "ship",
            Body::Asteroid(_) => "asteroid",
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        match self {
            Body::Ship(s) => s.draw(surface),
            Body::Asteroid(a) => a.draw(surface),
        }
    }

    pub fn outline(&self) -> Outline {
        match self {
            Body::Ship(s) => Outline::Polygon(s.outline().clone()),
            Body::Asteroid(a) => Outline::Ellipse(a.outline().clone()),
        }
    }

    /// Only ship/asteroid pairs can be tested; any other pairing is an error
    /// and leaves both bodies untouched.
    pub fn intersects(&self, other: &Body) -> GameResult<bool> {
        match (self, other) {
            (Body::Ship(s), Body::Asteroid(a)) => Ok(s.intersects(a)),
            (Body::Asteroid(a), Body::Ship(s)) => Ok(a.intersects(s)),
            _ => Err(GameError::UnsupportedIntersection {
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }
}

pub enum BodyMut<'a> {
    Ship(&'a mut Ship),
    Asteroid(&'a mut Asteroid),
}

impl BodyMut<'_> {
    pub fn move_body(&mut self) {
        match self {
            BodyMut::Ship(s) => s.move_ship(),
            BodyMut::Asteroid(a) => a.move_asteroid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn bounded_ship(y: f64, top: f64, bottom: f64) -> Ship {
        let mut ship = Ship::new(10.0, y);
        ship.set_movement_bounds(Rect::new(0.0, top, 800.0, bottom - top));
        ship
    }

    #[test]
    fn test_asteroid_visibility_boundary() {
        assert!(Asteroid::with_defaults(5.0, 100.0).is_visible());
        assert!(!Asteroid::with_defaults(4.0, 100.0).is_visible());
        assert!(!Asteroid::with_defaults(-30.0, 100.0).is_visible());
    }

    #[test]
    fn test_asteroid_moves_left_by_velocity() {
        let mut asteroid = Asteroid::new(300.0, 120.0, 25.0, 15.0, 3.0);
        asteroid.move_asteroid();
        assert_eq!(asteroid.position(), Vector2D::new(297.0, 120.0));
        assert_eq!((asteroid.width(), asteroid.height()), (25.0, 15.0));
    }

    #[test]
    fn test_default_asteroid() {
        let mut asteroid = Asteroid::with_defaults(50.0, 60.0);
        assert_eq!((asteroid.width(), asteroid.height(), asteroid.velocity()), (10.0, 10.0, 1.0));
        asteroid.move_asteroid();
        assert_eq!(asteroid.position(), Vector2D::new(49.0, 60.0));
    }

    #[test]
    fn test_ship_moves_one_step() {
        let mut ship = bounded_ship(50.0, 20.0, 100.0);
        ship.set_direction(Direction::Up);
        ship.move_ship();
        assert_eq!(ship.position().y, 49.0);
        ship.set_direction(Direction::Down);
        ship.move_ship();
        ship.move_ship();
        assert_eq!(ship.position().y, 51.0);
        ship.set_direction(Direction::None);
        ship.move_ship();
        assert_eq!(ship.position().y, 51.0);
    }

    #[test]
    fn test_ship_move_out_of_bounds_is_reverted() {
        let mut ship = bounded_ship(20.0, 20.0, 100.0);
        ship.set_direction(Direction::Up);
        ship.move_ship();
        assert_eq!(ship.position().y, 20.0);

        let mut ship = bounded_ship(80.0, 20.0, 100.0);
        ship.set_direction(Direction::Down);
        ship.move_ship();
        assert_eq!(ship.position().y, 80.0);
    }

    #[test]
    fn test_unbounded_ship_moves_freely() {
        let mut ship = Ship::new(10.0, 0.0);
        ship.set_direction(Direction::Up);
        ship.move_ship();
        assert_eq!(ship.position().y, -1.0);
    }

    #[test]
    fn test_ship_never_leaves_bounds() {
        let mut ship = bounded_ship(280.0, 100.0, 300.0);
        ship.set_direction(Direction::Up);
        for _ in 0..200 {
            ship.move_ship();
            assert!(ship.position().y >= 100.0);
        }
        assert_eq!(ship.position().y, 100.0);
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let ship = Ship::new(10.0, rng.gen_range(0.0..80.0));
            let asteroid = Asteroid::new(
                rng.gen_range(0.0..60.0),
                rng.gen_range(0.0..100.0),
                rng.gen_range(10.0..40.0),
                rng.gen_range(10.0..40.0),
                1.0,
            );
            assert_eq!(ship.intersects(&asteroid), asteroid.intersects(&ship));
        }
    }

    #[test]
    fn test_tangent_asteroid_does_not_collide() {
        let ship = Ship::new(0.0, 0.0);
        let asteroid = Asteroid::new(20.0, 0.0, 20.0, 20.0, 1.0);
        assert!(!ship.intersects(&asteroid));
        assert!(!asteroid.intersects(&ship));

        let overlapping = Asteroid::new(18.0, 0.0, 20.0, 20.0, 1.0);
        assert!(ship.intersects(&overlapping));
    }

    #[test]
    fn test_asteroid_containing_ship_collides() {
        let ship = Ship::new(12.0, 10.0);
        let asteroid = Asteroid::new(0.0, 0.0, 40.0, 40.0, 1.0);
        assert!(asteroid.intersects(&ship));
    }

    #[test]
    fn test_body_intersection_dispatch() {
        let ship = Ship::new(12.0, 10.0);
        let asteroid = Asteroid::new(0.0, 0.0, 40.0, 40.0, 1.0);
        assert!(Body::Ship(&ship).intersects(&Body::Asteroid(&asteroid)).unwrap());
        assert!(Body::Asteroid(&asteroid).intersects(&Body::Ship(&ship)).unwrap());

        let other = Asteroid::with_defaults(0.0, 0.0);
        let err = Body::Asteroid(&asteroid).intersects(&Body::Asteroid(&other)).unwrap_err();
        assert!(matches!(
            err,
            GameError::UnsupportedIntersection { left: "asteroid", right: "asteroid" }
        ));
        assert_eq!(err.to_string(), "intersection between asteroid and asteroid is not supported");

        let second_ship = Ship::new(0.0, 0.0);
        assert!(Body::Ship(&ship).intersects(&Body::Ship(&second_ship)).is_err());
        assert_eq!(ship.position(), Vector2D::new(12.0, 10.0));
    }

    #[test]
    fn test_body_move_and_outline() {
        let mut asteroid = Asteroid::new(100.0, 40.0, 20.0, 10.0, 2.0);
        BodyMut::Asteroid(&mut asteroid).move_body();
        let outline = Body::Asteroid(&asteroid).outline();
        assert_eq!(outline.bounds(), Rect::new(98.0, 40.0, 20.0, 10.0));

        let mut ship = Ship::new(10.0, 50.0);
        ship.set_direction(Direction::Down);
        BodyMut::Ship(&mut ship).move_body();
        let outline = Body::Ship(&ship).outline();
        assert_eq!(outline.bounds(), Rect::new(10.0, 51.0, 20.0, 20.0));
        assert_eq!(Body::Ship(&ship).kind(), "ship");
    }
}
