//! Board model shared by the stipple jobs
//!
//! # Submodules
//! - `types` - Vias, elements, pads, pins, lines and polygon records
//! - `layer` - Named layers with a per-layer polygon R-tree
//! - `model` - The shared board, per-layer locks, layer writer and undo log
//! - `file` - JSON board file load/save

mod file;
mod layer;
mod model;
mod types;

pub use file::{BoardFile, LayerFile, PolygonFile};
pub use layer::{Layer, PolygonEnvelope};
pub use model::{Board, LayerId, LayerWriter, UndoEntry};
pub use types::{Element, LineRecord, Pad, Pin, PolygonFlags, PolygonId, PolygonRecord, Via};
