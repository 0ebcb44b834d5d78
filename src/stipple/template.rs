//! Template polygon reader

use super::cancel::CancelToken;
use crate::board::Layer;
use crate::error::{Result, StippleError};
use crate::geometry::Polygon;
use tracing::debug;

/// Read the outlines of a template layer's polygons, in layer order
///
/// With `only_selected`, unselected records are skipped. Outlines with fewer
/// than three distinct points are dropped. The token is checked once per
/// record, and a cancelled read discards everything gathered so far.
pub fn read_template(
    layer: &Layer,
    only_selected: bool,
    cancel: &CancelToken,
) -> Result<Vec<Polygon>> {
    let mut outlines = Vec::with_capacity(layer.polygons().len());
    for record in layer.polygons() {
        if cancel.is_cancelled() {
            return Err(StippleError::Cancelled);
        }
        if only_selected && !record.flags.selected {
            continue;
        }
        let outline = Polygon::new(record.outline.clone());
        if outline.len() < 3 {
            debug!(
                layer = %layer.name,
                polygon = record.id,
                "Skipping degenerate template polygon"
            );
            continue;
        }
        outlines.push(outline);
    }
    Ok(outlines)
}
