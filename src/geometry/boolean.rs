//! Boolean and offset operations on integer polygon sets
//!
//! Backed by the Clipper engine through `geo-clipper`. Board coordinates are
//! already integers, so the scaling factor is 1 and results round back to
//! whole board units without loss.
//!
//! Inputs may use either winding; every shape is re-oriented (outline
//! counter-clockwise, holes clockwise) before it reaches Clipper. Degenerate
//! inputs and results are dropped silently.

use super::types::{Coord, Point, Polygon, PolygonSet, PolygonWithHoles};
use geo::algorithm::orient::{Direction, Orient};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Clipper scaling factor; board units are already integral
const FACTOR: f64 = 1.0;

/// Miter limit used when insetting, in multiples of the offset distance
const MITER_LIMIT: f64 = 2.0;

fn ring_to_geo(ring: &Polygon) -> LineString<f64> {
    let mut coords: Vec<GeoCoord<f64>> = ring
        .points()
        .iter()
        .map(|p| GeoCoord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }
    LineString::new(coords)
}

fn shape_to_geo(shape: &PolygonWithHoles) -> GeoPolygon<f64> {
    let holes = shape
        .holes
        .iter()
        .filter(|h| !h.is_degenerate())
        .map(ring_to_geo)
        .collect();
    GeoPolygon::new(ring_to_geo(&shape.outline), holes).orient(Direction::Default)
}

fn shapes_to_geo(shapes: &[PolygonWithHoles]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        shapes
            .iter()
            .filter(|s| !s.outline.is_degenerate())
            .map(shape_to_geo)
            .collect(),
    )
}

fn ring_from_geo(ring: &LineString<f64>) -> Polygon {
    Polygon::new(ring.coords().map(|c| Point::rounded(c.x, c.y)).collect())
}

fn shapes_from_geo(multi: &MultiPolygon<f64>) -> PolygonSet {
    multi
        .0
        .iter()
        .filter_map(|poly| {
            let outline = ring_from_geo(poly.exterior());
            if outline.is_degenerate() {
                return None;
            }
            let holes = poly
                .interiors()
                .iter()
                .map(ring_from_geo)
                .filter(|h| !h.is_degenerate())
                .collect();
            Some(PolygonWithHoles::new(outline, holes))
        })
        .collect()
}

/// Merge overlapping shapes into maximal disjoint islands
///
/// Shapes are folded one at a time into a running union, so overlapping
/// members of the input never meet inside a single Clipper operand.
pub fn union(shapes: &[PolygonWithHoles]) -> PolygonSet {
    let mut merged: MultiPolygon<f64> = MultiPolygon::new(Vec::new());
    for shape in shapes.iter().filter(|s| !s.outline.is_degenerate()) {
        merged = merged.union(&shape_to_geo(shape), FACTOR);
    }
    shapes_from_geo(&merged)
}

/// Union of two sets whose members are each already pairwise disjoint
pub fn union_with(a: &[PolygonWithHoles], b: &[PolygonWithHoles]) -> PolygonSet {
    if b.is_empty() {
        return a.to_vec();
    }
    let merged = shapes_to_geo(a).union(&shapes_to_geo(b), FACTOR);
    shapes_from_geo(&merged)
}

/// Area covered by both `a` and `b`
pub fn intersect(a: &[PolygonWithHoles], b: &[PolygonWithHoles]) -> PolygonSet {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let result = shapes_to_geo(a).intersection(&shapes_to_geo(b), FACTOR);
    shapes_from_geo(&result)
}

/// Area covered by `a` but not by `b`
pub fn difference(a: &[PolygonWithHoles], b: &[PolygonWithHoles]) -> PolygonSet {
    if a.is_empty() {
        return Vec::new();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    let result = shapes_to_geo(a).difference(&shapes_to_geo(b), FACTOR);
    shapes_from_geo(&result)
}

/// Offset every shape by `delta` board units
///
/// A negative `delta` shrinks along the inward normal and a positive one grows.
/// Shapes that collapse while shrinking disappear from the result.
pub fn inset(shapes: &[PolygonWithHoles], delta: Coord) -> PolygonSet {
    if shapes.is_empty() {
        return Vec::new();
    }
    if delta == 0 {
        return union(shapes);
    }
    let result = shapes_to_geo(shapes).offset(
        delta as f64,
        JoinType::Miter(MITER_LIMIT),
        EndType::ClosedPolygon,
        FACTOR,
    );
    shapes_from_geo(&result)
}
