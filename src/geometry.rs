//! Outlines for bodies in the play field and the overlap test between them.
//!
//! Overlap means the filled interiors share a region of non-zero area, so
//! shapes that only touch along an edge or at a vertex do not overlap.

use crate::types::{Rect, Vector2D};

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub points: Vec<Vector2D>,
}

impl Polygon {
    pub fn new(points: Vec<Vector2D>) -> Self {
        Polygon { points }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let offset = Vector2D::new(dx, dy);
        for point in &mut self.points {
            *point = point.add(offset);
        }
    }

    pub fn bounds(&self) -> Rect {
        let mut min = Vector2D::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vector2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for point in &self.points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        if self.points.is_empty() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Even-odd test. Points exactly on an edge may go either way.
    pub fn contains_point(&self, point: Vector2D) -> bool {
        points_enclose(&self.points, point)
    }

    pub fn edges(&self) -> impl Iterator<Item = (Vector2D, Vector2D)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// Ellipse inscribed in its bounding frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipse {
    pub frame: Rect,
}

impl Ellipse {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Ellipse { frame: Rect::new(x, y, width, height) }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.frame.x += dx;
        self.frame.y += dy;
    }

    pub fn bounds(&self) -> Rect {
        self.frame
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(
            self.frame.x + self.frame.width / 2.0,
            self.frame.y + self.frame.height / 2.0,
        )
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.frame.width / 2.0, self.frame.height / 2.0)
    }

    pub fn contains_point(&self, point: Vector2D) -> bool {
        let (rx, ry) = self.radii();
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let c = self.center();
        let nx = (point.x - c.x) / rx;
        let ny = (point.y - c.y) / ry;
        nx * nx + ny * ny <= 1.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outline {
    Polygon(Polygon),
    Ellipse(Ellipse),
}

impl Outline {
    pub fn bounds(&self) -> Rect {
        match self {
            Outline::Polygon(p) => p.bounds(),
            Outline::Ellipse(e) => e.bounds(),
        }
    }
}

/// Two-phase overlap test: bounding boxes first, exact interiors after.
pub fn polygon_overlaps_ellipse(polygon: &Polygon, ellipse: &Ellipse) -> bool {
    if !polygon.bounds().overlaps(&ellipse.bounds()) {
        return false;
    }
    interiors_overlap(polygon, ellipse)
}

// Maps the ellipse onto the unit circle. The map is affine, so the polygon
// stays a polygon and interior overlap is preserved.
fn interiors_overlap(polygon: &Polygon, ellipse: &Ellipse) -> bool {
    let (rx, ry) = ellipse.radii();
    if rx <= 0.0 || ry <= 0.0 || polygon.points.len() < 3 {
        return false;
    }
    let c = ellipse.center();
    let unit: Vec<Vector2D> = polygon
        .points
        .iter()
        .map(|p| Vector2D::new((p.x - c.x) / rx, (p.y - c.y) / ry))
        .collect();
    let origin = Vector2D::new(0.0, 0.0);

    if points_enclose(&unit, origin) {
        return true;
    }

    let n = unit.len();
    (0..n).any(|i| segment_distance_squared(origin, unit[i], unit[(i + 1) % n]) < 1.0)
}

fn points_enclose(points: &[Vector2D], p: Vector2D) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn segment_distance_squared(p: Vector2D, a: Vector2D, b: Vector2D) -> f64 {
    let ab = b.sub(a);
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.sub(a).length_squared();
    }
    let t = (p.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.sub(a.add(ab.scale(t))).length_squared()
}
