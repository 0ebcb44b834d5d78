//! JSON board file persistence
//!
//! Rings are written closed (first point repeated at the end) and opened
//! again on load, so every in-memory polygon stays in the open form.

use super::model::Board;
use super::types::{Element, LineRecord, PolygonFlags, PolygonRecord, Via};
use crate::error::{Result, StippleError};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// On-disk board document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardFile {
    #[serde(default)]
    pub layers: Vec<LayerFile>,
    #[serde(default)]
    pub vias: Vec<Via>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFile {
    pub name: String,
    #[serde(default)]
    pub polygons: Vec<PolygonFile>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFile {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub flags: PolygonFlags,
    pub outline: Vec<Point>,
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

fn close_ring(ring: &[Point]) -> Vec<Point> {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            closed.push(*first);
        }
    }
    closed
}

fn open_ring(mut ring: Vec<Point>) -> Vec<Point> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

impl PolygonFile {
    fn from_record(record: &PolygonRecord) -> Self {
        Self {
            id: Some(record.id),
            flags: record.flags,
            outline: close_ring(&record.outline),
            holes: record.holes.iter().map(|h| close_ring(h)).collect(),
        }
    }
}

impl Board {
    /// Build a board from a parsed board document
    pub fn from_file_data(data: BoardFile) -> Self {
        let mut board = Board::new();
        for layer_file in data.layers {
            let layer = board.add_layer(&layer_file.name);
            for line in layer_file.lines {
                board.add_line(layer, line);
            }
            for poly in layer_file.polygons {
                let outline = open_ring(poly.outline);
                let holes = poly.holes.into_iter().map(open_ring).collect();
                board.add_polygon(layer, poly.flags, outline, holes);
            }
        }
        for via in data.vias {
            board.add_via(via);
        }
        for element in data.elements {
            board.add_element(element);
        }
        board
    }

    /// Snapshot the board as a board document
    pub fn to_file_data(&self) -> BoardFile {
        let layers = self
            .layer_names()
            .enumerate()
            .map(|(index, name)| {
                let layer = self.layer(super::LayerId(index));
                let polygons = layer.polygons().iter().map(PolygonFile::from_record).collect();
                let lines = layer.lines().to_vec();
                LayerFile {
                    name: name.to_string(),
                    polygons,
                    lines,
                }
            })
            .collect();
        BoardFile {
            layers,
            vias: self.vias().to_vec(),
            elements: self.elements().to_vec(),
        }
    }

    /// Load a board from a JSON board file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StippleError::BoardIo {
            path: path.to_path_buf(),
            source,
        })?;
        let data: BoardFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                StippleError::BoardFormat {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        let board = Self::from_file_data(data);
        info!(
            path = %path.display(),
            layers = board.layer_count(),
            vias = board.vias().len(),
            elements = board.elements().len(),
            "Loaded board"
        );
        Ok(board)
    }

    /// Write the board as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| StippleError::BoardIo {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_file_data()).map_err(|source| {
            StippleError::BoardFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), "Saved board");
        Ok(())
    }
}
