//! Board record types
//!
//! Plain data records for the board features the stipple pipeline reads
//! (vias, elements with pads and pins, copper lines) and the polygon records
//! it writes.

use crate::geometry::{Coord, Point, Rect};
use serde::{Deserialize, Serialize};

/// Unique polygon record identifier (board-wide)
pub type PolygonId = u64;

/// Plated through-hole not owned by an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub x: Coord,
    pub y: Coord,
    pub thickness: Coord,
    pub clearance: Coord,
}

/// Through-hole pin owned by an element (present on both sides)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub x: Coord,
    pub y: Coord,
    pub thickness: Coord,
    pub clearance: Coord,
}

/// Surface-mount pad, drawn as a thick segment between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub point1: Point,
    pub point2: Point,
    pub thickness: Coord,
    pub clearance: Coord,
}

impl Pad {
    /// Extent of the pad's centre line (both points, normalised)
    pub fn extent(&self) -> Rect {
        Rect::from_corners(self.point1, self.point2)
    }
}

/// A placed component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub name: String,
    /// Placed on the component (front) side
    pub front: bool,
    #[serde(default)]
    pub pads: Vec<Pad>,
    #[serde(default)]
    pub pins: Vec<Pin>,
}

/// Copper track segment on a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub point1: Point,
    pub point2: Point,
    pub thickness: Coord,
    pub clearance: Coord,
}

/// Polygon record flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolygonFlags {
    /// Polygon clears around other copper
    #[serde(default)]
    pub clear_poly: bool,
    /// Keep every piece of the polygon even when bisected
    #[serde(default)]
    pub full_poly: bool,
    #[serde(default)]
    pub selected: bool,
}

impl PolygonFlags {
    /// Flags for a stippled base polygon
    pub const fn stippled() -> Self {
        Self {
            clear_poly: true,
            full_poly: false,
            selected: false,
        }
    }

    /// Flags for a forced-solid overlay polygon
    pub const fn overlay() -> Self {
        Self {
            clear_poly: true,
            full_poly: true,
            selected: false,
        }
    }
}

/// Polygon record on a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRecord {
    pub id: PolygonId,
    pub flags: PolygonFlags,
    /// Outline vertices without a closing point
    pub outline: Vec<Point>,
    /// Hole rings without closing points
    pub holes: Vec<Vec<Point>>,
    /// Set once the polygon is finished
    pub bounds: Option<Rect>,
}

impl PolygonRecord {
    pub fn new(id: PolygonId, flags: PolygonFlags) -> Self {
        Self {
            id,
            flags,
            outline: Vec::new(),
            holes: Vec::new(),
            bounds: None,
        }
    }

    /// Bounding box of the outline vertices
    pub fn compute_bounds(&self) -> Option<Rect> {
        let first = self.outline.first()?;
        Some(self.outline.iter().skip(1).fold(
            Rect::from_corners(*first, *first),
            |r, p| Rect {
                min: Point::new(r.min.x.min(p.x), r.min.y.min(p.y)),
                max: Point::new(r.max.x.max(p.x), r.max.y.max(p.y)),
            },
        ))
    }
}
