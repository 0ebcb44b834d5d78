//! Geometry module for stipple computation
//!
//! Integer polygon types, boolean/offset operators and keepout shape builders.
//!
//! # Submodules
//! - `types` - Core primitives (Point, Polygon, PolygonWithHoles, Rect)
//! - `boolean` - Union, intersection, difference and inset over polygon sets
//! - `shapes` - Circles, line capsules and rounded rectangles for keepouts

mod types;
mod boolean;
pub mod shapes;

pub use types::{
    bounding_box,
    Coord,
    Point,
    Polygon,
    PolygonSet,
    PolygonWithHoles,
    Rect,
};

pub use boolean::{
    difference,
    inset,
    intersect,
    union,
    union_with,
};
