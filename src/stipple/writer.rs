//! Writes stippled regions into a board layer

use super::lattice::StippledRegion;
use crate::board::{Board, LayerId, LayerWriter, PolygonFlags, PolygonId};
use crate::geometry::{Polygon, PolygonWithHoles};
use tracing::debug;

/// Counts of records touched by one write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub removed: usize,
    pub regions: usize,
    pub overlays: usize,
}

fn remove_all(writer: &mut LayerWriter<'_>) -> usize {
    let ids = writer.polygon_ids();
    ids.into_iter()
        .filter(|id| writer.remove_polygon(*id).is_some())
        .count()
}

fn write_shape(
    writer: &mut LayerWriter<'_>,
    flags: PolygonFlags,
    outline: &Polygon,
    holes: &[Polygon],
) -> PolygonId {
    let id = writer.create_polygon(flags);
    for point in outline.points() {
        writer.add_outline_point(id, *point);
    }
    for hole in holes {
        writer.add_hole(id);
        for point in hole.points() {
            writer.add_hole_point(id, *point);
        }
    }
    writer.finish_polygon(id);
    id
}

/// Write regions to a layer under its write lock
///
/// Each region becomes one clearing polygon with its cut-outs as holes. A
/// second pass writes every overlay as an independent full polygon. With
/// `replace_existing`, the layer's polygons are removed first.
pub fn write_regions(
    board: &Board,
    layer: LayerId,
    regions: &[StippledRegion],
    replace_existing: bool,
) -> WriteSummary {
    let mut writer = board.lock_layer(layer);
    let mut summary = WriteSummary::default();

    if replace_existing {
        summary.removed = remove_all(&mut writer);
    }

    for region in regions {
        let holes: Vec<Polygon> = region.cut_outs.iter().map(|c| c.outline.clone()).collect();
        write_shape(&mut writer, PolygonFlags::stippled(), &region.outline, &holes);
        summary.regions += 1;
    }

    for region in regions {
        for PolygonWithHoles { outline, holes } in &region.overlays {
            write_shape(&mut writer, PolygonFlags::overlay(), outline, holes);
            summary.overlays += 1;
        }
    }

    debug!(
        layer = writer.name(),
        removed = summary.removed,
        regions = summary.regions,
        overlays = summary.overlays,
        "Wrote stippled regions"
    );
    summary
}

/// Remove every polygon record from a layer
pub fn clear_layer(board: &Board, layer: LayerId) -> usize {
    let mut writer = board.lock_layer(layer);
    let removed = remove_all(&mut writer);
    debug!(layer = writer.name(), removed, "Cleared layer");
    removed
}
