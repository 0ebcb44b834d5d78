//! Board layers and their polygon spatial index
//!
//! Each layer owns its polygon and line records. Finished polygons are kept in
//! an R-tree keyed by bounding box so later queries can find them by area.

use super::types::{LineRecord, PolygonId, PolygonRecord};
use crate::geometry::{Coord, Rect};
use rstar::{RTree, RTreeObject, AABB};

/// R-tree entry for a finished polygon record
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonEnvelope {
    pub id: PolygonId,
    pub bounds: AABB<[Coord; 2]>,
}

impl PolygonEnvelope {
    pub fn new(id: PolygonId, rect: Rect) -> Self {
        let bounds = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);
        Self { id, bounds }
    }
}

impl RTreeObject for PolygonEnvelope {
    type Envelope = AABB<[Coord; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// A named board layer
#[derive(Default)]
pub struct Layer {
    pub name: String,
    pub(crate) polygons: Vec<PolygonRecord>,
    pub(crate) lines: Vec<LineRecord>,
    /// Created on first insertion
    pub(crate) polygon_tree: Option<RTree<PolygonEnvelope>>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn polygons(&self) -> &[PolygonRecord] {
        &self.polygons
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&PolygonRecord> {
        self.polygons.iter().find(|p| p.id == id)
    }

    /// Polygons whose bounding boxes intersect `area`
    pub fn polygons_in(&self, area: Rect) -> Vec<PolygonId> {
        let Some(tree) = &self.polygon_tree else {
            return Vec::new();
        };
        let search = AABB::from_corners([area.min.x, area.min.y], [area.max.x, area.max.y]);
        let mut ids: Vec<PolygonId> = tree
            .locate_in_envelope_intersecting(&search)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of polygons registered in the spatial index
    pub fn indexed_polygon_count(&self) -> usize {
        self.polygon_tree.as_ref().map_or(0, RTree::size)
    }

    /// Newest records are the ones being built, so search from the back
    pub(crate) fn polygon_mut(&mut self, id: PolygonId) -> Option<&mut PolygonRecord> {
        self.polygons.iter_mut().rev().find(|p| p.id == id)
    }

    pub(crate) fn index_polygon(&mut self, id: PolygonId, rect: Rect) {
        self.polygon_tree
            .get_or_insert_with(RTree::new)
            .insert(PolygonEnvelope::new(id, rect));
    }

    pub(crate) fn unindex_polygon(&mut self, record: &PolygonRecord) {
        if let (Some(tree), Some(rect)) = (self.polygon_tree.as_mut(), record.bounds) {
            tree.remove(&PolygonEnvelope::new(record.id, rect));
        }
    }
}
