use std::fmt::Display;
use std::ops::{Add, Sub};

/// Tolerance used for boundary tests (ray hits, clip inside-test, parallel lines).
pub const EPS: f64 = 1e-12;

/// A point in the RpG (x) / BpG (y) plane.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// z component of the cross product `self x other`.
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

/// Axis-aligned rectangle, inclusive on all four edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Rect {
    pub const fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Rect {
        Rect { xmin, xmax, ymin, ymax }
    }

    /// Top-right corner, `(xmax, ymax)`.
    pub fn top_right(&self) -> Point {
        Point::new(self.xmax, self.ymax)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.xmin <= p.x && p.x <= self.xmax && self.ymin <= p.y && p.y <= self.ymax
    }
}

/// Shoelace signed area; positive for counter-clockwise winding. Fewer than
/// three vertices have zero area.
pub fn signed_area(poly: &[Point]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += poly[i].cross(poly[(i + 1) % n]);
    }
    0.5 * sum
}

pub fn polygon_area(poly: &[Point]) -> f64 {
    signed_area(poly).abs()
}
