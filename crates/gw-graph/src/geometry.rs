//! Planar geometry helpers used by siting and corridor searches.

/// A position in the plane (longitude/latitude or abstract km grid).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box, keyed like a map query: north/south/east/west.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Strict interior test (points on the border are outside).
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.west && p.x < self.east && p.y < self.north && p.y > self.south
    }
}

/// Perpendicular distance from `p0` to the infinite line through `p1` and `p2`.
///
/// Degenerates to the point distance when `p1 == p2`.
pub fn line_point_distance(p0: Point, p1: Point, p2: Point) -> f64 {
    let denominator = p1.distance(&p2);
    if denominator == 0.0 {
        return p0.distance(&p1);
    }
    let numerator = ((p2.x - p1.x) * (p1.y - p0.y) - (p1.x - p0.x) * (p2.y - p1.y)).abs();
    numerator / denominator
}
