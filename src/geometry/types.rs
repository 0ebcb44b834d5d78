//! Core geometry types for stipple computation
//!
//! All coordinates are integer board units. Polygons are stored as open rings:
//! the first vertex is never repeated at the end. Code that talks to a format
//! which needs the closing point adds it at that boundary.

use serde::{Deserialize, Serialize};

/// Board length unit (nanometre-equivalent)
pub type Coord = i64;

/// A 2D point in board units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Round floating point coordinates to the nearest board unit
    pub fn rounded(x: f64, y: f64) -> Self {
        Self {
            x: x.round() as Coord,
            y: y.round() as Coord,
        }
    }
}

/// Axis-aligned bounding box, inclusive on both corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Build a rectangle from any two opposite corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> Coord {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Coord {
        self.max.y - self.min.y
    }

    /// Grow the rectangle by `amount` on every side
    pub fn inflate(&self, amount: Coord) -> Self {
        Self {
            min: Point::new(self.min.x - amount, self.min.y - amount),
            max: Point::new(self.max.x + amount, self.max.y + amount),
        }
    }
}

/// A closed polygon stored as an open vertex ring
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Build a polygon from a vertex sequence, dropping an explicit closing
    /// point and consecutive duplicates
    pub fn new(points: Vec<Point>) -> Self {
        let mut ring: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if ring.last() != Some(&p) {
                ring.push(p);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        Self { points: ring }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three distinct vertices or zero area
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.signed_area_x2() == 0
    }

    /// Vertices followed by a repeat of the first vertex
    pub fn closed_points(&self) -> Vec<Point> {
        let mut out = self.points.clone();
        if let Some(first) = self.points.first() {
            out.push(*first);
        }
        out
    }

    /// Twice the signed area (positive for counter-clockwise rings)
    pub fn signed_area_x2(&self) -> i128 {
        let n = self.points.len();
        if n < 3 {
            return 0;
        }
        let mut sum: i128 = 0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
        }
        sum
    }

    pub fn area(&self) -> f64 {
        (self.signed_area_x2() as f64 / 2.0).abs()
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        bounding_box(self)
    }
}

/// A filled polygon with subtracted holes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolygonWithHoles {
    pub outline: Polygon,
    pub holes: Vec<Polygon>,
}

impl PolygonWithHoles {
    pub fn new(outline: Polygon, holes: Vec<Polygon>) -> Self {
        Self { outline, holes }
    }

    /// Net filled area (outline minus holes)
    pub fn area(&self) -> f64 {
        self.outline.area() - self.holes.iter().map(Polygon::area).sum::<f64>()
    }
}

impl From<Polygon> for PolygonWithHoles {
    fn from(outline: Polygon) -> Self {
        Self {
            outline,
            holes: Vec::new(),
        }
    }
}

/// Unordered collection of disjoint shapes
pub type PolygonSet = Vec<PolygonWithHoles>;

/// Axis-aligned bounding box of a polygon's vertices
pub fn bounding_box(polygon: &Polygon) -> Option<Rect> {
    let first = polygon.points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &polygon.points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Rect { min, max })
}
