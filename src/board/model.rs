//! Shared board model
//!
//! The board is shared by every per-layer stipple job. Each layer sits behind
//! its own read/write lock so jobs targeting different layers never serialise
//! on each other; board-wide features (vias, elements) are immutable once the
//! board is built. Every polygon mutation made through a [`LayerWriter`] is
//! recorded in the undo log.

use super::layer::Layer;
use super::types::{Element, LineRecord, PolygonFlags, PolygonId, PolygonRecord, Via};
use crate::geometry::Point;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Index of a layer within its board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub(crate) usize);

/// Undo log entry for one polygon mutation
#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    Created { layer: String, polygon_id: PolygonId },
    Removed { layer: String, polygon: PolygonRecord },
}

/// In-memory board: named layers plus board-level vias and elements
pub struct Board {
    layers: IndexMap<String, RwLock<Layer>>,
    vias: Vec<Via>,
    elements: Vec<Element>,
    undo_log: Mutex<Vec<UndoEntry>>,
    dirty: AtomicBool,
    next_polygon_id: AtomicU64,
}

impl Board {
    pub fn new() -> Self {
        Self {
            layers: IndexMap::new(),
            vias: Vec::new(),
            elements: Vec::new(),
            undo_log: Mutex::new(Vec::new()),
            dirty: AtomicBool::new(false),
            next_polygon_id: AtomicU64::new(1),
        }
    }

    /// Add a layer, or return the existing layer with that name
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        if let Some(index) = self.layers.get_index_of(name) {
            return LayerId(index);
        }
        let (index, _) = self
            .layers
            .insert_full(name.to_string(), RwLock::new(Layer::new(name)));
        LayerId(index)
    }

    pub fn add_via(&mut self, via: Via) {
        self.vias.push(via);
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn add_line(&mut self, layer: LayerId, line: LineRecord) {
        if let Some((_, lock)) = self.layers.get_index_mut(layer.0) {
            lock.get_mut().lines.push(line);
        }
    }

    /// Insert a finished polygon record while building a board
    ///
    /// Not recorded for undo; used when loading a board or seeding templates.
    pub fn add_polygon(
        &mut self,
        layer: LayerId,
        flags: PolygonFlags,
        outline: Vec<Point>,
        holes: Vec<Vec<Point>>,
    ) -> Option<PolygonId> {
        let id = self.allocate_polygon_id();
        let (_, lock) = self.layers.get_index_mut(layer.0)?;
        let layer = lock.get_mut();
        let mut record = PolygonRecord::new(id, flags);
        record.outline = outline;
        record.holes = holes;
        record.bounds = record.compute_bounds();
        if let Some(rect) = record.bounds {
            layer.index_polygon(id, rect);
        }
        layer.polygons.push(record);
        Some(id)
    }

    pub fn find_layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers.get_index_of(name).map(LayerId)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Shared read access to a layer's records
    ///
    /// # Panics
    /// Panics if `layer` does not belong to this board.
    pub fn layer(&self, layer: LayerId) -> RwLockReadGuard<'_, Layer> {
        self.layers[layer.0].read()
    }

    /// Exclusive write access to a layer for the duration of the guard
    ///
    /// # Panics
    /// Panics if `layer` does not belong to this board.
    pub fn lock_layer(&self, layer: LayerId) -> LayerWriter<'_> {
        LayerWriter {
            board: self,
            layer: self.layers[layer.0].write(),
        }
    }

    pub fn vias(&self) -> &[Via] {
        &self.vias
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Snapshot of the undo log, oldest first
    pub fn undo_entries(&self) -> Vec<UndoEntry> {
        self.undo_log.lock().clone()
    }

    fn allocate_polygon_id(&self) -> PolygonId {
        self.next_polygon_id.fetch_add(1, Ordering::Relaxed)
    }

    fn record_undo(&self, entry: UndoEntry) {
        self.undo_log.lock().push(entry);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Write handle for one layer, holding the layer's lock
pub struct LayerWriter<'a> {
    board: &'a Board,
    layer: RwLockWriteGuard<'a, Layer>,
}

impl LayerWriter<'_> {
    pub fn name(&self) -> &str {
        &self.layer.name
    }

    pub fn polygon_ids(&self) -> Vec<PolygonId> {
        self.layer.polygons.iter().map(|p| p.id).collect()
    }

    /// Start a new, empty polygon record
    pub fn create_polygon(&mut self, flags: PolygonFlags) -> PolygonId {
        let id = self.board.allocate_polygon_id();
        self.layer.polygons.push(PolygonRecord::new(id, flags));
        id
    }

    pub fn add_outline_point(&mut self, id: PolygonId, point: Point) {
        if let Some(record) = self.layer.polygon_mut(id) {
            record.outline.push(point);
        }
    }

    /// Begin a new hole; following hole points go into it
    pub fn add_hole(&mut self, id: PolygonId) {
        if let Some(record) = self.layer.polygon_mut(id) {
            record.holes.push(Vec::new());
        }
    }

    pub fn add_hole_point(&mut self, id: PolygonId, point: Point) {
        if let Some(hole) = self
            .layer
            .polygon_mut(id)
            .and_then(|record| record.holes.last_mut())
        {
            hole.push(point);
        }
    }

    /// Set the bounding box, register the polygon in the spatial index and
    /// record its creation for undo
    pub fn finish_polygon(&mut self, id: PolygonId) {
        let Some(record) = self.layer.polygon_mut(id) else {
            return;
        };
        record.bounds = record.compute_bounds();
        if let Some(rect) = record.bounds {
            self.layer.index_polygon(id, rect);
        }
        self.board.record_undo(UndoEntry::Created {
            layer: self.layer.name.clone(),
            polygon_id: id,
        });
    }

    /// Remove a polygon record, recording it for undo
    pub fn remove_polygon(&mut self, id: PolygonId) -> Option<PolygonRecord> {
        let index = self.layer.polygons.iter().position(|p| p.id == id)?;
        let record = self.layer.polygons.remove(index);
        self.layer.unindex_polygon(&record);
        self.board.record_undo(UndoEntry::Removed {
            layer: self.layer.name.clone(),
            polygon: record.clone(),
        });
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_keep_insertion_order() {
        let mut board = Board::new();
        let a = board.add_layer("comp-perim");
        let b = board.add_layer("comp-stipple");
        assert_eq!(board.add_layer("comp-perim"), a);
        assert_eq!(board.find_layer_by_name("comp-stipple"), Some(b));
        assert_eq!(board.find_layer_by_name("missing"), None);
        assert_eq!(
            board.layer_names().collect::<Vec<_>>(),
            vec!["comp-perim", "comp-stipple"]
        );
    }

    #[test]
    fn test_writer_builds_polygon_with_hole() {
        let mut board = Board::new();
        let layer = board.add_layer("comp-stipple");

        let id = {
            let mut writer = board.lock_layer(layer);
            let id = writer.create_polygon(PolygonFlags::stippled());
            for p in [(0, 0), (100, 0), (100, 100), (0, 100)] {
                writer.add_outline_point(id, Point::new(p.0, p.1));
            }
            writer.add_hole(id);
            for p in [(40, 40), (60, 40), (50, 60)] {
                writer.add_hole_point(id, Point::new(p.0, p.1));
            }
            writer.finish_polygon(id);
            id
        };

        let guard = board.layer(layer);
        let record = guard.polygon(id).unwrap();
        assert_eq!(record.outline.len(), 4);
        assert_eq!(record.holes.len(), 1);
        assert_eq!(record.holes[0].len(), 3);
        assert_eq!(guard.indexed_polygon_count(), 1);
        drop(guard);

        assert_eq!(
            board.undo_entries(),
            vec![UndoEntry::Created {
                layer: "comp-stipple".to_string(),
                polygon_id: id
            }]
        );
    }

    #[test]
    fn test_remove_is_recorded() {
        let mut board = Board::new();
        let layer = board.add_layer("solder-stipple");
        let id = board
            .add_polygon(
                layer,
                PolygonFlags::default(),
                vec![Point::new(0, 0), Point::new(5, 0), Point::new(5, 5)],
                vec![],
            )
            .unwrap();

        let removed = board.lock_layer(layer).remove_polygon(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(board.layer(layer).polygons().is_empty());
        assert_eq!(board.layer(layer).indexed_polygon_count(), 0);
        assert!(matches!(
            board.undo_entries().as_slice(),
            [UndoEntry::Removed { polygon, .. }] if polygon.id == id
        ));
        assert!(board.lock_layer(layer).remove_polygon(id).is_none());
    }

    #[test]
    fn test_dirty_flag() {
        let board = Board::new();
        assert!(!board.is_dirty());
        board.mark_dirty();
        assert!(board.is_dirty());
    }
}
